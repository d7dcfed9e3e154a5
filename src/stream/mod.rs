//! The entropy-coded symbol stream: cluster map, distributions, hybrid
//! integers and LZ77 composed behind a single `read_symbol(context)`.

pub mod cluster_map;
pub mod lz77;

pub use cluster_map::read_cluster_map;
pub use lz77::{map_distance, Lz77Params, Window, SPECIAL_DISTANCES};

use std::sync::Arc;

use log::{debug, trace};

use crate::ans::{AnsDistribution, AnsState};
use crate::bitstream::{BitReader, U32Distr};
use crate::error::{EntropyError, Result};
use crate::hybrid::HybridIntegerConfig;
use crate::prefix::PrefixDistribution;
use crate::{Symbol, Token};

const LZ77_MIN_SYMBOL: [U32Distr; 4] = [(224, 0), (512, 0), (4096, 0), (8, 15)];
const LZ77_MIN_LENGTH: [U32Distr; 4] = [(3, 0), (4, 0), (5, 2), (9, 8)];
const LZ77_LENGTH_LOG_ALPHABET_SIZE: u32 = 8;

/// The log alphabet size hybrid configs are parsed with when prefix codes are in use.
const PREFIX_LOG_ALPHABET_SIZE: u32 = 15;

/// Reads a cluster map into a caller-sized slice, returning the number of clusters.
pub type ClusterMapReader<R> = fn(&mut R, &mut [usize], usize) -> Result<usize>;

/// The statistical model of one cluster.
#[derive(Clone, Debug)]
pub enum Distribution {
    Ans(AnsDistribution),
    Prefix(PrefixDistribution),
}

impl Distribution {
    /// Decodes a raw token. Only ANS distributions touch `state`.
    #[inline(always)]
    pub fn read_symbol<R: BitReader>(&self, reader: &mut R, state: &mut AnsState) -> Result<Token> {
        match self {
            Distribution::Ans(distribution) => distribution.read_symbol(reader, state),
            Distribution::Prefix(distribution) => distribution.read_symbol(reader),
        }
    }

    pub fn alphabet_size(&self) -> usize {
        match self {
            Distribution::Ans(distribution) => distribution.alphabet_size(),
            Distribution::Prefix(distribution) => distribution.alphabet_size(),
        }
    }
}

/// Everything parsed from a stream header, shared by all the forks of the stream.
#[derive(Debug)]
struct Tables {
    cluster_map: Box<[usize]>,
    distributions: Box<[Distribution]>,
    configs: Box<[HybridIntegerConfig]>,
    log_alphabet_size: u32,
    lz77: Option<Lz77Params>,
}

/// A decoder of entropy-coded integers, each read under a context.
///
/// Contexts are mapped to clusters, and each cluster has its own distribution and
/// hybrid integer configuration. When LZ77 is enabled an extra context, the last
/// one, holds the distribution of copy distances.
#[derive(Debug)]
pub struct EntropyStream {
    tables: Arc<Tables>,
    state: AnsState,
    window: Option<Window>,
}

impl EntropyStream {
    /// Parses a stream header for `num_dists` contexts.
    pub fn new<R: BitReader>(reader: &mut R, num_dists: usize, disallow_lz77: bool) -> Result<Self> {
        Self::with_cluster_map_reader(reader, num_dists, disallow_lz77, read_cluster_map)
    }

    /// Parses a stream header, reading its cluster map with `read_cluster_map`.
    pub fn with_cluster_map_reader<R: BitReader>(
        reader: &mut R,
        num_dists: usize,
        disallow_lz77: bool,
        read_cluster_map: ClusterMapReader<R>,
    ) -> Result<Self> {
        if num_dists == 0 {
            return Err(EntropyError::NoDistributions);
        }

        let mut num_contexts = num_dists;
        let lz77 = if reader.read_bool()? {
            if disallow_lz77 {
                return Err(EntropyError::Lz77Disallowed);
            }
            let min_symbol = reader.read_u32(LZ77_MIN_SYMBOL)?;
            let min_length = reader.read_u32(LZ77_MIN_LENGTH)?;
            let length_config = HybridIntegerConfig::read(reader, LZ77_LENGTH_LOG_ALPHABET_SIZE)?;
            num_contexts += 1;
            Some(Lz77Params {
                min_symbol,
                min_length,
                length_config,
            })
        } else {
            None
        };

        let mut cluster_map = vec![0; num_contexts].into_boxed_slice();
        let num_clusters = read_cluster_map(reader, &mut cluster_map, num_contexts)?;

        let prefix_codes = reader.read_bool()?;
        let log_alphabet_size = if prefix_codes {
            PREFIX_LOG_ALPHABET_SIZE
        } else {
            5 + reader.read_bits(2)? as u32
        };

        let configs = (0..num_clusters)
            .map(|_| HybridIntegerConfig::read(reader, log_alphabet_size))
            .collect::<Result<Box<[_]>>>()?;

        let distributions = if prefix_codes {
            let mut alphabet_sizes = Vec::with_capacity(num_clusters);
            for _ in 0..num_clusters {
                let size = if reader.read_bool()? {
                    let n = reader.read_bits(4)? as usize;
                    1 + (1 << n) + reader.read_bits(n)? as usize
                } else {
                    1
                };
                if size > 1 << PREFIX_LOG_ALPHABET_SIZE {
                    return Err(EntropyError::AlphabetSize {
                        size,
                        capacity: 1 << PREFIX_LOG_ALPHABET_SIZE,
                    });
                }
                alphabet_sizes.push(size);
            }
            alphabet_sizes
                .into_iter()
                .map(|size| PrefixDistribution::read(reader, size).map(Distribution::Prefix))
                .collect::<Result<Box<[_]>>>()?
        } else {
            (0..num_clusters)
                .map(|_| AnsDistribution::read(reader, log_alphabet_size).map(Distribution::Ans))
                .collect::<Result<Box<[_]>>>()?
        };

        debug!(
            "entropy stream: {} contexts, {} clusters, {} codes, LZ77 {:?}",
            num_contexts,
            num_clusters,
            if prefix_codes { "prefix" } else { "ANS" },
            lz77
        );
        for (cluster, (distribution, config)) in distributions.iter().zip(configs.iter()).enumerate() {
            trace!(
                "cluster {}: {} symbols, {:?}",
                cluster,
                distribution.alphabet_size(),
                config
            );
        }

        let window = lz77.map(|_| Window::new());
        Ok(Self {
            tables: Arc::new(Tables {
                cluster_map,
                distributions,
                configs,
                log_alphabet_size,
                lz77,
            }),
            state: AnsState::new(),
            window,
        })
    }

    /// A fresh stream decoding with the same tables, from a new state and an empty window.
    pub fn fork(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            state: AnsState::new(),
            window: self.tables.lz77.map(|_| Window::new()),
        }
    }

    /// Decodes the next integer of `context`.
    #[inline]
    pub fn read_symbol<R: BitReader>(&mut self, reader: &mut R, context: usize) -> Result<Symbol> {
        self.read_symbol_with_multiplier(reader, context, 0)
    }

    /// Decodes the next integer of `context`, interpreting LZ77 distances for rows
    /// of `distance_multiplier` values. A zero multiplier disables special distances.
    pub fn read_symbol_with_multiplier<R: BitReader>(
        &mut self,
        reader: &mut R,
        context: usize,
        distance_multiplier: u32,
    ) -> Result<Symbol> {
        if let Some(window) = self.window.as_mut().filter(|window| window.is_copying()) {
            return Ok(window.copy_next());
        }

        let tables = &*self.tables;
        let cluster = *tables
            .cluster_map
            .get(context)
            .ok_or(EntropyError::ContextOutOfRange {
                context,
                contexts: tables.cluster_map.len(),
            })?;
        let (distribution, config) = tables.cluster(cluster)?;
        let token = distribution.read_symbol(reader, &mut self.state)?;

        if let (Some(lz77), Some(window)) = (&tables.lz77, self.window.as_mut()) {
            if token >= lz77.min_symbol {
                let length = lz77
                    .min_length
                    .saturating_add(lz77.length_config.expand(reader, token - lz77.min_symbol)?);

                let distance_cluster = tables.cluster_map[tables.cluster_map.len() - 1];
                let (distance_distribution, distance_config) = tables.cluster(distance_cluster)?;
                let distance_token = distance_distribution.read_symbol(reader, &mut self.state)?;
                let distance = distance_config.expand(reader, distance_token)?;

                return Ok(window.start_copy(map_distance(distance, distance_multiplier), length));
            }

            let value = config.expand(reader, token)?;
            window.push(value);
            return Ok(value);
        }

        config.expand(reader, token)
    }

    /// Whether the ANS state is back to the value encoders start from, which
    /// holds exactly after the last symbol of a well-formed stream.
    pub fn validate_final_state(&self) -> bool {
        self.state.is_final()
    }

    pub fn ans_state(&self) -> &AnsState {
        &self.state
    }

    /// The number of contexts, including the LZ77 distance context.
    pub fn num_contexts(&self) -> usize {
        self.tables.cluster_map.len()
    }

    pub fn num_clusters(&self) -> usize {
        self.tables.distributions.len()
    }

    pub fn cluster_map(&self) -> &[usize] {
        &self.tables.cluster_map
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.tables.distributions
    }

    pub fn configs(&self) -> &[HybridIntegerConfig] {
        &self.tables.configs
    }

    pub fn log_alphabet_size(&self) -> u32 {
        self.tables.log_alphabet_size
    }

    pub fn lz77(&self) -> Option<&Lz77Params> {
        self.tables.lz77.as_ref()
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

impl Tables {
    #[inline(always)]
    fn cluster(&self, cluster: usize) -> Result<(&Distribution, &HybridIntegerConfig)> {
        match (self.distributions.get(cluster), self.configs.get(cluster)) {
            (Some(distribution), Some(config)) => Ok((distribution, config)),
            _ => Err(EntropyError::ClusterOutOfRange {
                cluster,
                clusters: self.distributions.len(),
            }),
        }
    }
}
