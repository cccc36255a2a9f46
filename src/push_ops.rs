use crate::hash::ValueT;

/// Receives scanned entries one at a time. Returning false ends the scan.
pub trait PushOp {
    fn invoke(&mut self, key: &[u8], value: &[u8]) -> bool;
}

impl<F> PushOp for F
where
    F: FnMut(&[u8], &[u8]) -> bool,
{
    fn invoke(&mut self, key: &[u8], value: &[u8]) -> bool {
        self(key, value)
    }
}

/// Joins every scanned value into one buffer, each prefixed by `", "`.
#[derive(Debug, Default)]
pub struct ConcatPushOp {
    concat_result: Vec<u8>,
}

impl ConcatPushOp {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self) -> &[u8] {
        &self.concat_result
    }
}

impl PushOp for ConcatPushOp {
    fn invoke(&mut self, _key: &[u8], value: &[u8]) -> bool {
        self.concat_result.extend_from_slice(b", ");
        self.concat_result.extend_from_slice(value);
        true
    }
}

/// Collects the scanned values in delivery order.
#[derive(Debug, Default)]
pub struct VectorPushOp {
    result: Vec<ValueT>,
}

impl VectorPushOp {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn clear(&mut self) {
        self.result.clear();
    }
    pub fn get(&self) -> &[ValueT] {
        &self.result
    }
}

impl PushOp for VectorPushOp {
    fn invoke(&mut self, _key: &[u8], value: &[u8]) -> bool {
        self.result.push(value.to_vec());
        true
    }
}

/// Accepts `len` entries and asks the scan to stop on the next one.
#[derive(Debug, Default)]
pub struct LimitOp {
    range_scanned: usize,
    len: usize,
}

impl LimitOp {
    pub fn new(len: usize) -> Self {
        LimitOp {
            range_scanned: 0,
            len,
        }
    }
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
    }
    pub fn range_scanned(&self) -> usize {
        self.range_scanned.min(self.len)
    }
}

impl PushOp for LimitOp {
    fn invoke(&mut self, _key: &[u8], _value: &[u8]) -> bool {
        self.range_scanned += 1;
        self.range_scanned <= self.len
    }
}
