use ciborium::value::Value;

/// Sort map entries into CTAP2 canonical form: shorter encoded keys first,
/// equal lengths bytewise. Attestation objects are hashed and signed, so
/// the byte stream must come out identical on every encode.
pub(crate) fn canonical_map(mut entries: Vec<(Value, Value)>) -> Value {
    entries.sort_by_cached_key(|(key, _)| {
        let bytes = key_bytes(key);
        (bytes.len(), bytes)
    });
    Value::Map(entries)
}

fn key_bytes(key: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(key, &mut buf).expect("CBOR key encoding is infallible");
    buf
}
