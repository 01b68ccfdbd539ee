//! Constant pools for program emission.
//!
//! Pools are append-only and deduplicated by value equality on insertion.
//! Lookup is a linear scan: queries carry a handful of constants, so a hash
//! index would cost more than it saves.

use std::net::IpAddr;

/// Largest pool size addressable by an `Operand::Index`.
pub const MAX_POOL_LEN: usize = i32::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("too many {pool} constants: {len} (max {max})", max = MAX_POOL_LEN)]
pub struct PoolOverflow {
    pub pool: &'static str,
    pub len: usize,
}

/// Append-only, deduplicated constant pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool<T> {
    values: Vec<T>,
}

impl<T> Default for ConstantPool<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: PartialEq> ConstantPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `value`, appending it when not already present.
    pub fn intern(&mut self, value: T) -> u32 {
        if let Some(i) = self.position(&value) {
            return i;
        }
        self.values.push(value);
        (self.values.len() - 1) as u32
    }

    pub fn position(&self, value: &T) -> Option<u32> {
        self.values.iter().position(|v| v == value).map(|i| i as u32)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }
}

impl<T: PartialEq> FromIterator<T> for ConstantPool<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut pool = Self::new();
        for v in iter {
            pool.intern(v);
        }
        pool
    }
}

/// The five value pools plus the regex pattern pool of one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPools {
    pub fields: ConstantPool<String>,
    pub strings: ConstantPool<String>,
    pub numbers: ConstantPool<f64>,
    /// Epoch nanoseconds.
    pub datetimes: ConstantPool<i64>,
    pub ips: ConstantPool<IpAddr>,
    pub regexes: ConstantPool<String>,
}

impl ConstantPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_field(&mut self, name: &str) -> u32 {
        intern_str(&mut self.fields, name)
    }

    pub fn intern_string(&mut self, s: &str) -> u32 {
        intern_str(&mut self.strings, s)
    }

    pub fn intern_number(&mut self, n: f64) -> u32 {
        self.numbers.intern(n)
    }

    pub fn intern_datetime(&mut self, nanos: i64) -> u32 {
        self.datetimes.intern(nanos)
    }

    pub fn intern_ip(&mut self, ip: IpAddr) -> u32 {
        self.ips.intern(ip)
    }

    pub fn intern_regex(&mut self, pattern: &str) -> u32 {
        intern_str(&mut self.regexes, pattern)
    }

    /// Check every pool fits the operand encoding.
    pub fn validate(&self) -> Result<(), PoolOverflow> {
        let sizes = [
            ("field", self.fields.len()),
            ("string", self.strings.len()),
            ("number", self.numbers.len()),
            ("datetime", self.datetimes.len()),
            ("ip", self.ips.len()),
            ("regex", self.regexes.len()),
        ];
        for (pool, len) in sizes {
            if len > MAX_POOL_LEN {
                return Err(PoolOverflow { pool, len });
            }
        }
        Ok(())
    }
}

/// Intern without allocating when the string is already pooled.
fn intern_str(pool: &mut ConstantPool<String>, s: &str) -> u32 {
    if let Some(i) = pool.values.iter().position(|v| v == s) {
        return i as u32;
    }
    pool.values.push(s.to_string());
    (pool.values.len() - 1) as u32
}
