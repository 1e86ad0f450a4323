//! # Chunked Strategy Store
//!
//! Per-turn, index-addressable persistence for computed [`Strategy`] values.
//! A turn's directory holds an `index.json` mapping each solved state's hex
//! encoding to the chunk file it lives in, plus `chunks/chunk-<nnnn>.json`
//! files that actually carry the strategies. Chunk files are
//! read-merge-write ("append-updated"); a bounded in-memory LRU keeps the
//! hottest chunks resident to cut down on disk thrashing during a batch.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{ChunkIndex, Encoding, StateCount};
use crate::strategy::Strategy;
use crate::util::encode_hex;

/// Current on-disk format version for `index.json`.
const INDEX_VERSION: u32 = 1;

/// Default LRU capacity: how many chunk files may be resident in memory at
/// once.
pub const DEFAULT_LRU_CAPACITY: usize = 10;

/// `turn-<t>/index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Index {
    version: u32,
    #[serde(rename = "chunkSize")]
    chunk_size: usize,
    #[serde(rename = "totalChunks")]
    total_chunks: ChunkIndex,
    #[serde(rename = "totalStates")]
    total_states: StateCount,
    // A `BTreeMap`, not a `HashMap`: this field is serialized verbatim into
    // `index.json`, and `serde_json` walks a map in its iteration order, so
    // a hash map would make the file's key order (and thus its bytes)
    // nondeterministic across runs on the same input.
    #[serde(rename = "hashToChunk")]
    hash_to_chunk: BTreeMap<String, ChunkIndex>,
}

impl Index {
    fn fresh(chunk_size: usize) -> Self {
        Index {
            version: INDEX_VERSION,
            chunk_size,
            total_chunks: 0,
            total_states: 0,
            hash_to_chunk: BTreeMap::new(),
        }
    }
}

/// `turn-<t>/chunks/chunk-<nnnn>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChunkFile {
    #[serde(rename = "chunkNumber")]
    chunk_number: ChunkIndex,
    count: usize,
    // `BTreeMap` for the same reason as `Index::hash_to_chunk`: deterministic
    // byte output for identical input, not just identical parsed content.
    strategies: BTreeMap<String, Strategy>,
}

/// A turn's chunked strategy store: reads and writes [`Strategy`] values
/// keyed by their state's hex encoding, backed by an LRU-bounded set of
/// resident chunk files.
pub struct TurnStore {
    dir: PathBuf,
    index: Index,
    index_dirty: bool,
    cache: HashMap<ChunkIndex, ChunkFile>,
    /// Most-recently-used chunk numbers, front = most recent.
    recency: VecDeque<ChunkIndex>,
    dirty_chunks: HashSet<ChunkIndex>,
    capacity: usize,
}

impl TurnStore {
    /// Opens (or creates) the store rooted at `dir`, i.e. `turn-<t>/`.
    /// `chunk_size` only takes effect when no `index.json` exists yet.
    pub fn open(dir: &Path, chunk_size: usize) -> anyhow::Result<Self> {
        fs::create_dir_all(dir.join("chunks"))?;
        let index_path = dir.join("index.json");
        let index = if index_path.exists() {
            serde_json::from_str(&fs::read_to_string(&index_path)?)?
        } else {
            Index::fresh(chunk_size)
        };
        Ok(TurnStore {
            dir: dir.to_path_buf(),
            index,
            index_dirty: false,
            cache: HashMap::new(),
            recency: VecDeque::new(),
            dirty_chunks: HashSet::new(),
            capacity: DEFAULT_LRU_CAPACITY,
        })
    }

    /// Number of strategies already stored in this turn.
    pub fn len(&self) -> StateCount {
        self.index.total_states
    }

    pub fn is_empty(&self) -> bool {
        self.index.total_states == 0
    }

    /// Returns `true` if `encoding` already has a stored strategy.
    pub fn contains(&self, encoding: Encoding) -> bool {
        self.index.hash_to_chunk.contains_key(&encode_hex(encoding))
    }

    /// Reads the stored strategy for `encoding`, if any, loading its chunk
    /// into the LRU if it is not already resident.
    pub fn get(&mut self, encoding: Encoding) -> anyhow::Result<Option<Strategy>> {
        let hex = encode_hex(encoding);
        let Some(&chunk_number) = self.index.hash_to_chunk.get(&hex) else {
            return Ok(None);
        };
        self.ensure_loaded(chunk_number)?;
        Ok(self
            .cache
            .get(&chunk_number)
            .and_then(|c| c.strategies.get(&hex))
            .cloned())
    }

    /// Writes `strategy` for `encoding`. Strategies are written exactly once
    /// per state; calling this twice for the same `encoding` is a caller
    /// bug and panics in debug builds.
    pub fn put(&mut self, encoding: Encoding, strategy: Strategy) -> anyhow::Result<()> {
        let hex = encode_hex(encoding);
        debug_assert!(
            !self.index.hash_to_chunk.contains_key(&hex),
            "strategy for {hex} was already written"
        );

        let chunk_number =
            (self.index.total_states as usize / self.index.chunk_size) as ChunkIndex;
        self.ensure_loaded(chunk_number)?;

        let chunk = self.cache.entry(chunk_number).or_insert_with(|| ChunkFile {
            chunk_number,
            count: 0,
            strategies: BTreeMap::new(),
        });
        chunk.strategies.insert(hex.clone(), strategy);
        chunk.count = chunk.strategies.len();
        self.dirty_chunks.insert(chunk_number);

        self.index.hash_to_chunk.insert(hex, chunk_number);
        self.index.total_states += 1;
        if chunk_number + 1 > self.index.total_chunks {
            self.index.total_chunks = chunk_number + 1;
        }
        self.index_dirty = true;
        Ok(())
    }

    /// Bulk-loads every stored strategy in this turn into a flat map,
    /// bypassing the LRU entirely. This is how the driver preloads a whole
    /// turn to serve as the successor oracle for the solver.
    pub fn load_all(&self) -> anyhow::Result<HashMap<Encoding, Strategy>> {
        let mut out = HashMap::with_capacity(self.index.total_states as usize);
        for k in 0..self.index.total_chunks {
            let chunk = self.read_chunk_from_disk(k)?;
            for (hex, strategy) in chunk.strategies {
                out.insert(crate::util::decode_hex(&hex)?, strategy);
            }
        }
        Ok(out)
    }

    /// Flushes every dirty chunk and the index to disk. The driver calls
    /// this after each batch.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        for chunk_number in self.dirty_chunks.drain().collect::<Vec<_>>() {
            if let Some(chunk) = self.cache.get(&chunk_number) {
                self.write_chunk_to_disk(chunk)?;
            }
        }
        if self.index_dirty {
            fs::write(
                self.dir.join("index.json"),
                serde_json::to_string(&self.index)?,
            )?;
            self.index_dirty = false;
        }
        Ok(())
    }

    fn ensure_loaded(&mut self, chunk_number: ChunkIndex) -> anyhow::Result<()> {
        if !self.cache.contains_key(&chunk_number) {
            let chunk = if self.chunk_path(chunk_number).exists() {
                self.read_chunk_from_disk(chunk_number)?
            } else {
                ChunkFile {
                    chunk_number,
                    count: 0,
                    strategies: BTreeMap::new(),
                }
            };
            self.cache.insert(chunk_number, chunk);
            self.evict_if_needed()?;
        }
        self.touch(chunk_number);
        Ok(())
    }

    fn touch(&mut self, chunk_number: ChunkIndex) {
        self.recency.retain(|&c| c != chunk_number);
        self.recency.push_front(chunk_number);
    }

    fn evict_if_needed(&mut self) -> anyhow::Result<()> {
        while self.cache.len() > self.capacity {
            let Some(victim) = self.recency.pop_back() else {
                break;
            };
            if self.dirty_chunks.remove(&victim) {
                if let Some(chunk) = self.cache.get(&victim) {
                    self.write_chunk_to_disk(chunk)?;
                }
            }
            self.cache.remove(&victim);
        }
        Ok(())
    }

    fn chunk_path(&self, chunk_number: ChunkIndex) -> PathBuf {
        self.dir.join("chunks").join(format!("chunk-{chunk_number:04}.json"))
    }

    fn read_chunk_from_disk(&self, chunk_number: ChunkIndex) -> anyhow::Result<ChunkFile> {
        let contents = fs::read_to_string(self.chunk_path(chunk_number))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_chunk_to_disk(&self, chunk: &ChunkFile) -> anyhow::Result<()> {
        fs::write(
            self.chunk_path(chunk.chunk_number),
            serde_json::to_string(chunk)?,
        )?;
        Ok(())
    }
}
