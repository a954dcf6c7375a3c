//! Bundles: several modules plus an entry-point hash.

use crate::error::{FormatError, FormatResult};
use crate::module::Module;
use crate::reader::ByteReader;

/// Magic bytes of a bundle image (`.AxB`).
pub const BUNDLE_MAGIC: [u8; 4] = [0x2e, 0x41, 0x78, 0x42];

/// Supported bundle format version.
pub const BUNDLE_VERSION: u16 = 1;

/// A set of modules sorted by hash.
///
/// # Examples
///
/// ```
/// use bytecode_system::{Bundle, ModuleBuilder};
///
/// let a = ModuleBuilder::new(30).build().unwrap();
/// let b = ModuleBuilder::new(10).build().unwrap();
/// let bundle = Bundle::new(10, vec![a, b]).unwrap();
///
/// assert_eq!(bundle.find(30).map(|m| m.hash()), Some(30));
/// assert!(bundle.find(20).is_none());
/// assert_eq!(bundle.entry().map(|m| m.hash()), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    entry_point: u64,
    modules: Vec<Module>,
}

impl Bundle {
    /// Creates a bundle, sorting the modules by hash. Duplicate hashes are
    /// rejected.
    pub fn new(entry_point: u64, mut modules: Vec<Module>) -> FormatResult<Self> {
        if modules.len() > u16::MAX as usize {
            return Err(FormatError::TooMany {
                what: "module",
                count: modules.len(),
                limit: u16::MAX as usize,
            });
        }
        modules.sort_by_key(Module::hash);
        if let Some(pair) = modules.windows(2).find(|w| w[0].hash() == w[1].hash()) {
            return Err(FormatError::DuplicateModule(pair[0].hash()));
        }
        Ok(Bundle {
            entry_point,
            modules,
        })
    }

    /// Hash of the module to run first.
    pub fn entry_point(&self) -> u64 {
        self.entry_point
    }

    /// The entry-point module, if the bundle contains it.
    pub fn entry(&self) -> Option<&Module> {
        self.find(self.entry_point)
    }

    /// Modules in hash order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Consumes the bundle, yielding its modules in hash order.
    pub fn into_modules(self) -> Vec<Module> {
        self.modules
    }

    /// Binary search by hash.
    pub fn find(&self, hash: u64) -> Option<&Module> {
        self.find_with_probes(hash).0
    }

    /// Binary search by hash, also reporting how many modules were probed.
    /// At most `floor(log2 N) + 1` probes are needed.
    pub fn find_with_probes(&self, hash: u64) -> (Option<&Module>, usize) {
        let mut probes = 0;
        let (mut lo, mut hi) = (0usize, self.modules.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            probes += 1;
            let candidate = self.modules[mid].hash();
            if candidate == hash {
                return (Some(&self.modules[mid]), probes);
            } else if candidate < hash {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        (None, probes)
    }

    /// Decodes a bundle image.
    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        let mut reader = ByteReader::new(bytes);
        let found = reader.magic()?;
        if found != BUNDLE_MAGIC {
            return Err(FormatError::BadMagic {
                expected: BUNDLE_MAGIC,
                found,
            });
        }
        let version = reader.u16()?;
        if version != BUNDLE_VERSION {
            return Err(FormatError::UnsupportedVersion {
                what: "bundle",
                expected: BUNDLE_VERSION,
                found: version,
            });
        }
        let entry_point = reader.u64()?;
        let count = reader.u16()? as usize;

        let mut offset = reader.offset();
        let mut modules = Vec::with_capacity(count);
        for _ in 0..count {
            let (module, used) = Module::decode(&bytes[offset..])?;
            offset += used;
            modules.push(module);
        }
        log::debug!(
            "decoded bundle: {} modules, entry {:016x}",
            modules.len(),
            entry_point
        );
        Bundle::new(entry_point, modules)
    }

    /// Encodes the bundle image.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&BUNDLE_MAGIC);
        out.extend_from_slice(&BUNDLE_VERSION.to_le_bytes());
        out.extend_from_slice(&self.entry_point.to_le_bytes());
        out.extend_from_slice(&(self.modules.len() as u16).to_le_bytes());
        for module in &self.modules {
            out.extend_from_slice(&module.to_bytes());
        }
        out
    }
}
