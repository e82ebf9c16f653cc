use ulid::Ulid;

pub fn prescription_id_ulid() -> String {
    format!("rx_{}", Ulid::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescription_ids_are_prefixed_and_unique() {
        let a = prescription_id_ulid();
        let b = prescription_id_ulid();
        assert!(a.starts_with("rx_"));
        assert_eq!(a.len(), 3 + 26);
        assert_ne!(a, b);
    }
}
