// src/lexer/tables/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_with::{DeserializeAs, SerializeAs, serde_as};

use super::{N_SYMBOLS, NONE, StateId, TableBuilder, TransitionTableSet};
use crate::lexer::error::TableError;

// -------------------- JSON (de)serialization --------------------

/// Writes `NONE` as `-1`, the way generators emit signed tables.
struct Signed;

impl SerializeAs<u32> for Signed {
    fn serialize_as<S: Serializer>(v: &u32, s: S) -> Result<S::Ok, S::Error> {
        if *v == NONE {
            s.serialize_i64(-1)
        } else {
            s.serialize_u32(*v)
        }
    }
}

impl<'de> DeserializeAs<'de, u32> for Signed {
    fn deserialize_as<D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = i64::deserialize(d)?;
        match v {
            -1 => Ok(NONE),
            v if (0..NONE as i64).contains(&v) => Ok(v as u32),
            _ => Err(D::Error::custom(format!("table entry {v} out of range"))),
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize)]
struct TablesDisk {
    #[serde_as(as = "Vec<Signed>")]
    base: Vec<u32>,
    #[serde_as(as = "Vec<Signed>")]
    default: Vec<u32>,
    #[serde_as(as = "Vec<Signed>")]
    check: Vec<u32>,
    #[serde_as(as = "Vec<Signed>")]
    transition: Vec<u32>,
    #[serde_as(as = "Vec<Signed>")]
    backtrack: Vec<u32>,
}

impl From<&TransitionTableSet> for TablesDisk {
    fn from(t: &TransitionTableSet) -> Self {
        Self {
            base: t.base().to_vec(),
            default: t.default().to_vec(),
            check: t.check().to_vec(),
            transition: t.transition().to_vec(),
            backtrack: t.backtrack().to_vec(),
        }
    }
}

impl TablesDisk {
    fn into_tables(self) -> Result<TransitionTableSet, TableError> {
        TransitionTableSet::new(
            self.base,
            self.default,
            self.check,
            self.transition,
            self.backtrack,
        )
    }
}

pub fn save_tables_json(path: &Path, t: &TransitionTableSet) -> Result<(), TableError> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, &TablesDisk::from(t))?;
    w.flush()?;
    log::debug!("saved tables JSON to {}", path.display());
    Ok(())
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<TransitionTableSet, TableError> {
    log::debug!("parsing tables JSON ({} bytes)", data.len());
    serde_json::from_slice::<TablesDisk>(data)?.into_tables()
}

// -------------------- Compact binary (u32 LE) --------------------
//   magic: 8 bytes = "LXSTEP01"
//   u32:   n_states
//   u32:   n_slots
//   u32:   base[n_states], default[n_states], backtrack[n_states]
//   u32:   check[n_slots], transition[n_slots]

const BIN_MAGIC: &[u8; 8] = b"LXSTEP01";

pub fn save_tables_bin(path: &Path, t: &TransitionTableSet) -> Result<(), TableError> {
    let instant = Instant::now();
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);

    w.write_all(BIN_MAGIC)?;
    w.write_all(&(t.n_states() as u32).to_le_bytes())?;
    w.write_all(&(t.n_slots() as u32).to_le_bytes())?;
    for table in [t.base(), t.default(), t.backtrack(), t.check(), t.transition()] {
        for v in table {
            w.write_all(&v.to_le_bytes())?;
        }
    }
    w.flush()?;

    log::debug!(
        "saved tables to {} in {} ms",
        path.display(),
        instant.elapsed().as_millis()
    );
    Ok(())
}

#[inline]
fn take_u32(buf: &mut &[u8], what: &'static str) -> Result<u32, TableError> {
    let data: &[u8] = *buf;
    let Some((head, rest)) = data.split_first_chunk::<4>() else {
        return Err(TableError::Truncated { what });
    };
    *buf = rest;
    Ok(u32::from_le_bytes(*head))
}

fn take_table(buf: &mut &[u8], n: usize, what: &'static str) -> Result<Vec<u32>, TableError> {
    // Reject absurd counts before allocating for them.
    if buf.len() / 4 < n {
        return Err(TableError::Truncated { what });
    }
    (0..n).map(|_| take_u32(buf, what)).collect()
}

pub fn load_tables_bin_bytes(mut data: &[u8]) -> Result<TransitionTableSet, TableError> {
    let Some((magic, rest)) = data.split_first_chunk::<8>() else {
        return Err(TableError::Truncated { what: "header" });
    };
    if magic != BIN_MAGIC {
        return Err(TableError::BadMagic);
    }
    data = rest;

    let n_states = take_u32(&mut data, "header")? as usize;
    let n_slots = take_u32(&mut data, "header")? as usize;

    let base = take_table(&mut data, n_states, "base")?;
    let default = take_table(&mut data, n_states, "default")?;
    let backtrack = take_table(&mut data, n_states, "backtrack")?;
    let check = take_table(&mut data, n_slots, "check")?;
    let transition = take_table(&mut data, n_slots, "transition")?;
    if !data.is_empty() {
        return Err(TableError::TrailingBytes { count: data.len() });
    }

    log::debug!("loaded tables .bin: {n_states} states, {n_slots} slots");
    TransitionTableSet::new(base, default, check, transition, backtrack)
}

// -------------------- Packed 16-bit strings --------------------

/// Tables as emitted by ocamllex-style generators: one byte string per table,
/// each a run of little-endian signed 16-bit integers. Any extension tables
/// that follow these five are not consumed.
///
/// The encoding differs from [`TransitionTableSet`] in two places: a negative
/// `base` marks a terminal state that reports rule `-base - 1`, and `default`
/// is the state taken (consuming the byte) when `check` does not match.
/// Loading expands both into explicit edges and repacks them.
#[derive(Debug, Clone, Copy)]
pub struct PackedTables<'a> {
    pub base: &'a [u8],
    pub backtrack: &'a [u8],
    pub default: &'a [u8],
    pub transition: &'a [u8],
    pub check: &'a [u8],
}

fn unpack_i16(table: &'static str, bytes: &[u8]) -> Result<Vec<i16>, TableError> {
    if bytes.len() % 2 != 0 {
        return Err(TableError::OddLength {
            table,
            len: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// `-1` is absent; other negatives are malformed.
fn entry(table: &'static str, index: usize, v: i16) -> Result<Option<u32>, TableError> {
    match v {
        -1 => Ok(None),
        v if v < 0 => Err(TableError::NegativeEntry {
            table,
            index,
            value: v as i64,
        }),
        v => Ok(Some(v as u32)),
    }
}

pub fn load_packed_tables(p: PackedTables<'_>) -> Result<TransitionTableSet, TableError> {
    let base = unpack_i16("base", p.base)?;
    let backtrack = unpack_i16("backtrack", p.backtrack)?;
    let default = unpack_i16("default", p.default)?;
    let transition = unpack_i16("transition", p.transition)?;
    let check = unpack_i16("check", p.check)?;

    let n = base.len();
    if n == 0 {
        return Err(TableError::Empty);
    }
    for (table, len) in [("backtrack", backtrack.len()), ("default", default.len())] {
        if len != n {
            return Err(TableError::LengthMismatch {
                table,
                expected: n,
                found: len,
            });
        }
    }
    if transition.len() != check.len() {
        return Err(TableError::LengthMismatch {
            table: "transition",
            expected: check.len(),
            found: transition.len(),
        });
    }
    for (i, &c) in check.iter().enumerate() {
        entry("check", i, c)?;
    }

    let mut b = TableBuilder::with_states(n);
    let mut terminals = 0;
    for (s, &row) in base.iter().enumerate() {
        let state = s as StateId;
        if row < 0 {
            terminals += 1;
            b.accept(state, (-(row as i32) - 1) as u32);
            continue;
        }
        if let Some(rule) = entry("backtrack", s, backtrack[s])? {
            b.accept(state, rule);
        }
        let otherwise = entry("default", s, default[s])?;
        for symbol in 0..N_SYMBOLS {
            let idx = row as usize + symbol;
            let target = match check.get(idx) {
                Some(&owner) if owner as i32 == s as i32 => {
                    entry("transition", idx, transition[idx])?
                }
                _ => otherwise,
            };
            if let Some(to) = target {
                b.edge(state, symbol as u32, to);
            }
        }
    }

    log::debug!(
        "unpacked 16-bit tables: {n} states ({terminals} terminal), {} slots",
        check.len()
    );
    b.build()
}
