//! Property tests for the laws in the testable-properties section:
//! number-format equivalence, relaxation monotonicity/correctness, and the
//! branch-fixup domain. Grounded in the property-test suites the other
//! 6502 emulator crates in this corpus already carry for their own
//! instruction tables.

use proptest::prelude::*;

use mcs6502_core::{apply_fixup, assemble, maybe_relax, Fixup, FixupKind};

fn literal_forms(v: u8) -> [String; 3] {
    [format!("{}", v), format!("0x{:02X}", v), format!("${:02X}", v)]
}

proptest! {
    /// Decimal, `0x`-hex and `$`-hex spellings of the same zero-page byte
    /// must all assemble to identical bytes (§4.8 literal grammar).
    #[test]
    fn number_formats_produce_identical_bytes(v in 0u8..=0xFF) {
        let forms = literal_forms(v);
        let mut images: Vec<Vec<u8>> = Vec::with_capacity(3);
        for text in &forms {
            let src = format!("LDA {}", text);
            let result = assemble(&src);
            prop_assert!(result.diagnostics.is_empty());
            images.push(result.image);
        }
        prop_assert_eq!(&images[0], &images[1]);
        prop_assert_eq!(&images[0], &images[2]);
    }

    /// Relaxation monotonicity (§8): relaxing an already-relaxed fragment
    /// is a no-op, for every value that fits in a byte.
    #[test]
    fn relaxation_is_idempotent_for_every_byte_value(v in 0i32..=0xFF) {
        let mut bytes = vec![0xBDu8, 0x00, 0x00]; // LDA absolute,X placeholder
        let mut fx = Fixup::new(FixupKind::AddrRef, mcs6502_core::ExprValue::Const(v), false, Default::default());
        maybe_relax(&mut bytes, &mut fx, v);
        let once = bytes.clone();
        maybe_relax(&mut bytes, &mut fx, v);
        prop_assert_eq!(bytes, once);
    }

    /// Relaxation correctness (§8): every value above 0xFF keeps the
    /// 3-byte absolute encoding; every value at or below keeps 2 bytes.
    #[test]
    fn relaxation_shrinks_iff_value_fits_a_byte(v in 0i32..=0xFFFF) {
        let mut bytes = vec![0xBDu8, 0x00, 0x00];
        let mut fx = Fixup::new(FixupKind::AddrRef, mcs6502_core::ExprValue::Const(v), false, Default::default());
        maybe_relax(&mut bytes, &mut fx, v);
        if v <= 0xFF {
            prop_assert_eq!(bytes.len(), 2);
            prop_assert_eq!(fx.kind, FixupKind::Symbol8);
        } else {
            prop_assert_eq!(bytes.len(), 3);
            prop_assert_eq!(fx.kind, FixupKind::AddrRef);
        }
    }

    /// Branch fixup domain (§8): applying a Branch fixup within range
    /// always yields that exact signed byte; outside it, an error.
    #[test]
    fn branch_fixup_domain(delta in -200i32..200) {
        let mut bytes = vec![0xF0u8, 0x00];
        let fx = Fixup::new(FixupKind::Branch, mcs6502_core::ExprValue::Const(delta), false, Default::default());
        let result = apply_fixup(&mut bytes, &fx, delta);
        if (-0x80..=0x7F).contains(&delta) {
            prop_assert!(result.is_ok());
            if delta != 0 {
                prop_assert_eq!(bytes[1] as i8 as i32, delta);
            }
        } else {
            prop_assert!(result.is_err());
        }
    }
}
