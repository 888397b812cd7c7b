//! Tagged value codec
//!
//! Everything crossing the engine or storage boundary is framed here:
//! - `indexed_value`: 1 discriminator byte + payload (`'l'` Location, `'w'` Keyword)
//! - `wire`: LEB128 length-prefixed lists and maps terminated by a single 0x00
//! - `leb128`: the unsigned varint used by the framing

mod indexed_value;
pub mod leb128;
mod wire;

pub use indexed_value::{
    decode_indexed_value, encode_indexed_value, FindexKey, IndexedEntry, IndexedValue,
    IndexedValueKind, Keyword, Label, Location, KEYWORD_PREFIX, LOCATION_PREFIX,
};
pub use wire::{deserialize_list, deserialize_map, serialize_list, serialize_map};
