pub mod envelope;

pub use envelope::{
    RawResponse, classify_failure, decode_entity, decode_envelope, decode_list, decode_write,
    envelope_data,
};
