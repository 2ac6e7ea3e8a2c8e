//! Log record encoding: one version byte, then the postcard body of that
//! version's record layout.

use redb::TypeName;

pub mod v1;
pub use v1::Record;

/// A log record tagged with the layout it was written in.
#[derive(Debug, Clone)]
pub enum VersionedRecord {
    V1(v1::Record),
}

impl VersionedRecord {
    /// Converts to the current record layout.
    pub fn into_latest(self) -> Record {
        match self {
            VersionedRecord::V1(record) => record,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            VersionedRecord::V1(_) => v1::VERSION,
        }
    }

    fn encode(&self) -> Vec<u8> {
        let header = vec![self.version()];
        let encoded = match self {
            VersionedRecord::V1(record) => postcard::to_extend(record, header),
        };
        encoded.expect("log record encodes into a vec")
    }

    /// Panics on an empty buffer, an unknown version or a body that does not
    /// decode. Such a log cannot be replayed.
    fn decode(bytes: &[u8]) -> Self {
        let Some((&version, body)) = bytes.split_first() else {
            panic!("empty record");
        };
        match version {
            v1::VERSION => match postcard::from_bytes(body) {
                Ok(record) => VersionedRecord::V1(record),
                Err(err) => panic!("invalid record: {err}"),
            },
            other => panic!("unsupported record version: {other}"),
        }
    }
}

impl redb::Value for VersionedRecord {
    type SelfType<'a> = VersionedRecord;
    type AsBytes<'a> = Vec<u8>;

    fn fixed_width() -> Option<usize> {
        None
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        Self::decode(data)
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.encode()
    }

    fn type_name() -> TypeName {
        TypeName::new("cliplog::Record")
    }
}

#[cfg(test)]
mod tests;
