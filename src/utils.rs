//! Identifier minting
use bech32::Bech32m;
use chrono::Utc;
use uuid7::uuid7;

// construct a unique record id then encode using bech32. The hrp doubles
// as the store key prefix ("call_", "aff_", "user_").
pub fn mint_id(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Human-facing call number, date-prefixed. Uniqueness rides on the uuid7
/// random tail; the number is immutable once assigned.
pub fn mint_call_number() -> String {
    let uuid = uuid7();
    let bytes = uuid.as_bytes();
    let tail = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
    format!("CC-{}-{:08}", Utc::now().format("%Y%m%d"), tail % 100_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_carry_their_prefix() {
        let id = mint_id("call_").unwrap();
        assert!(id.starts_with("call_1"));
    }

    #[test]
    fn call_numbers_are_unique() {
        let a = mint_call_number();
        let b = mint_call_number();
        assert!(a.starts_with("CC-"));
        assert_ne!(a, b);
    }
}
