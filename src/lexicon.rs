//! Arena-backed, append-only interner from fingerprint to lexical-type
//! record.
//!
//! An ordinal-indexed `Vec` of records plus a `HashMap` from content key to
//! ordinal. The ordinal sequence is append-only across the process
//! lifetime, and round-trips through a flat on-disk record stream.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::num::NonZeroU32;
use std::path::Path;

use crate::features::{self, FeaturePayload};
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::string_store::{Interner, StringId, StringStore};
use crate::Error;

/// Maximum surface-form byte length storable in a persisted record.
///
/// Longer surfaces can still live in the in-memory lexicon; they simply
/// cannot be `dump`ed, which surfaces as [`Error::Corrupt`].
pub const MAX_SURFACE_BYTES: usize = 63;

const RECORD_SIZE: usize = 4 + 8 + 1 + MAX_SURFACE_BYTES + 16;

/// Stable, non-owning reference to a lexicon record.
///
/// Numerically equal to the record's ordinal; valid for the lifetime of the
/// lexicon that produced it (arena allocations never move or get freed
/// individually).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LexemeRef(NonZeroU32);

impl LexemeRef {
    #[must_use]
    pub fn ordinal(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// One record per distinct surface form ever seen by a lexicon.
#[derive(Debug, Clone)]
pub struct Lexeme {
    ordinal: NonZeroU32,
    fingerprint: Fingerprint,
    surface_id: StringId,
    payload: FeaturePayload,
}

impl Lexeme {
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal.get()
    }

    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    #[must_use]
    pub fn payload(&self) -> &FeaturePayload {
        &self.payload
    }
}

/// Append-only interner from fingerprint to [`Lexeme`].
///
/// Generic over the string-store collaborator; defaults to the crate's own
/// [`StringStore`].
#[derive(Clone)]
pub struct Lexicon<I: Interner + Clone = StringStore> {
    by_fingerprint: HashMap<Fingerprint, LexemeRef>,
    records: Vec<Lexeme>,
    interner: I,
}

impl Lexicon<StringStore> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_interner(StringStore::new())
    }
}

impl Default for Lexicon<StringStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interner + Clone> Lexicon<I> {
    pub fn with_interner(interner: I) -> Self {
        Self {
            by_fingerprint: HashMap::new(),
            records: Vec::new(),
            interner,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the existing record for `surface`'s fingerprint, or insert a
    /// new one.
    pub fn get(&mut self, surface: &str) -> LexemeRef {
        let fp = fingerprint(surface);
        if let Some(&existing) = self.by_fingerprint.get(&fp) {
            return existing;
        }
        self.insert_new(fp, surface, features::compute_features(surface))
    }

    /// Look up a record by fingerprint without inserting.
    #[must_use]
    pub fn find(&self, fp: Fingerprint) -> Option<LexemeRef> {
        self.by_fingerprint.get(&fp).copied()
    }

    /// Force the payload for `surface`, preserving the ordinal if the
    /// record already exists, creating it with the next ordinal otherwise.
    pub fn set(&mut self, surface: &str, payload: FeaturePayload) -> LexemeRef {
        let fp = fingerprint(surface);
        if let Some(&existing) = self.by_fingerprint.get(&fp) {
            self.records[existing.index()].payload = payload;
            return existing;
        }
        self.insert_new(fp, surface, payload)
    }

    /// Convenience read returning a by-value copy of the record for
    /// `surface`, if present.
    #[must_use]
    pub fn lookup(&self, surface: &str) -> Option<Lexeme> {
        let fp = fingerprint(surface);
        self.by_fingerprint
            .get(&fp)
            .map(|r| self.records[r.index()].clone())
    }

    #[must_use]
    pub fn resolve(&self, reference: LexemeRef) -> &str {
        self.interner.resolve(self.records[reference.index()].surface_id)
    }

    #[must_use]
    pub fn record(&self, reference: LexemeRef) -> &Lexeme {
        &self.records[reference.index()]
    }

    fn insert_new(&mut self, fp: Fingerprint, surface: &str, payload: FeaturePayload) -> LexemeRef {
        let ordinal = NonZeroU32::new(self.records.len() as u32 + 1).expect("ordinal never zero");
        let surface_id = self.interner.intern(surface);
        let reference = LexemeRef(ordinal);
        self.records.push(Lexeme {
            ordinal,
            fingerprint: fp,
            surface_id,
            payload,
        });
        self.by_fingerprint.insert(fp, reference);
        reference
    }

    /// Write every record except the reserved 0th to `path`, in ordinal
    /// order, as fixed-size native records.
    pub fn dump(&self, path: &Path) -> Result<(), Error> {
        if path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("dump path {} is a directory", path.display()),
            )));
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for record in &self.records {
            let surface = self.interner.resolve(record.surface_id);
            let surface_bytes = surface.as_bytes();
            if surface_bytes.len() > MAX_SURFACE_BYTES {
                return Err(Error::Corrupt(format!(
                    "surface form {surface:?} ({} bytes) exceeds the {MAX_SURFACE_BYTES}-byte record limit",
                    surface_bytes.len()
                )));
            }

            let mut buf = [0u8; RECORD_SIZE];
            let mut offset = 0;
            buf[offset..offset + 4].copy_from_slice(&record.ordinal.get().to_le_bytes());
            offset += 4;
            buf[offset..offset + 8].copy_from_slice(&record.fingerprint.to_le_bytes());
            offset += 8;
            buf[offset] = surface_bytes.len() as u8;
            offset += 1;
            buf[offset..offset + surface_bytes.len()].copy_from_slice(surface_bytes);
            offset = 4 + 8 + 1 + MAX_SURFACE_BYTES;
            buf[offset..offset + 16].copy_from_slice(&record.payload);

            writer.write_all(&buf)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read fixed-size records sequentially until a short read, rebuilding
    /// the fingerprint map and ordinal sequence.
    ///
    /// Must be called on an empty or freshly constructed lexicon.
    pub fn load(&mut self, path: &Path) -> Result<(), Error> {
        assert!(
            self.is_empty(),
            "Lexicon::load must be called on an empty lexicon"
        );
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut buf = [0u8; RECORD_SIZE];
        loop {
            let read = read_record(&mut reader, &mut buf)?;
            if read == 0 {
                break;
            }

            let mut offset = 0;
            let ordinal_bytes: [u8; 4] = buf[offset..offset + 4].try_into().unwrap();
            let ordinal = u32::from_le_bytes(ordinal_bytes);
            offset += 4;
            let fp_bytes: [u8; 8] = buf[offset..offset + 8].try_into().unwrap();
            let fp = u64::from_le_bytes(fp_bytes);
            offset += 8;
            let surface_len = buf[offset] as usize;
            offset += 1;
            if surface_len > MAX_SURFACE_BYTES {
                return Err(Error::Corrupt(format!(
                    "record claims surface length {surface_len} exceeding limit {MAX_SURFACE_BYTES}"
                )));
            }
            let surface = std::str::from_utf8(&buf[offset..offset + surface_len])
                .map_err(|e| Error::Corrupt(format!("record surface is not valid UTF-8: {e}")))?
                .to_owned();
            offset = 4 + 8 + 1 + MAX_SURFACE_BYTES;
            let payload: FeaturePayload = buf[offset..offset + 16].try_into().unwrap();

            let ordinal = NonZeroU32::new(ordinal)
                .ok_or_else(|| Error::Corrupt("record has reserved ordinal 0".to_string()))?;
            if ordinal.get() as usize != self.records.len() + 1 {
                return Err(Error::Corrupt(format!(
                    "record ordinal {ordinal} is not dense (expected {})",
                    self.records.len() + 1
                )));
            }

            let recomputed_fp = fingerprint(&surface);
            if recomputed_fp != fp {
                return Err(Error::Corrupt(format!(
                    "record {ordinal} stored fingerprint {fp:#x} does not match recomputed fingerprint {recomputed_fp:#x} for surface {surface:?}"
                )));
            }

            let surface_id = self.interner.intern(&surface);
            let reference = LexemeRef(ordinal);
            self.records.push(Lexeme {
                ordinal,
                fingerprint: fp,
                surface_id,
                payload,
            });
            self.by_fingerprint.insert(fp, reference);
        }
        Ok(())
    }
}

/// Read one fixed-size record, returning `0` at a clean end-of-file and the
/// record size on success. A partial record (fewer than `RECORD_SIZE` bytes
/// but more than zero) is an invariant violation.
fn read_record<R: Read>(reader: &mut R, buf: &mut [u8; RECORD_SIZE]) -> Result<usize, Error> {
    let mut total = 0;
    while total < RECORD_SIZE {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    if total != 0 && total != RECORD_SIZE {
        tracing::warn!(
            got = total,
            expected = RECORD_SIZE,
            "lexicon load truncated on a short read"
        );
        return Err(Error::Corrupt(format!(
            "short read: got {total} of {RECORD_SIZE} record bytes"
        )));
    }
    Ok(total)
}
