//! Property-based tests for cluster topology validation.

use proptest::prelude::*;

use qop_cloud::{ClusterConfig, FemType, QopError};

fn fem(lf: bool) -> FemType {
    if lf { FemType::LfFem } else { FemType::MwFem }
}

fn assign(config: &mut ClusterConfig, slot: u8, fem_type: FemType) -> Result<(), QopError> {
    let con = config.controller()?;
    match fem_type {
        FemType::LfFem => con.lf_fems([slot]).map(|_| ()),
        FemType::MwFem => con.mw_fems([slot]).map(|_| ()),
    }
}

proptest! {
    /// Every slot number outside [1, 8] is rejected, for either module type.
    #[test]
    fn out_of_range_slots_rejected(
        slot in proptest::num::u8::ANY.prop_filter("outside [1,8]", |s| !(1..=8).contains(s)),
        lf in proptest::bool::ANY,
    ) {
        let mut config = ClusterConfig::new();
        let err = assign(&mut config, slot, fem(lf)).unwrap_err();
        prop_assert!(matches!(err, QopError::Configuration(_)));
    }

    /// Every slot in [1, 8] is accepted and shows up in the wire form.
    #[test]
    fn valid_slots_accepted(slot in 1u8..=8, lf in proptest::bool::ANY) {
        let mut config = ClusterConfig::new();
        assign(&mut config, slot, fem(lf)).unwrap();

        let wire = config.to_wire();
        prop_assert_eq!(
            &wire["controllers"]["con1"]["slots"][slot.to_string()],
            fem(lf).as_str()
        );
    }

    /// Assigning an already-assigned slot fails and names the original type.
    #[test]
    fn duplicate_slots_name_original_type(
        slot in 1u8..=8,
        first_lf in proptest::bool::ANY,
        second_lf in proptest::bool::ANY,
    ) {
        let mut config = ClusterConfig::new();
        let con = config.controller().unwrap();
        match fem(first_lf) {
            FemType::LfFem => con.lf_fems([slot]).map(|_| ()).unwrap(),
            FemType::MwFem => con.mw_fems([slot]).map(|_| ()).unwrap(),
        }

        let err = match fem(second_lf) {
            FemType::LfFem => con.lf_fems([slot]).map(|_| ()).unwrap_err(),
            FemType::MwFem => con.mw_fems([slot]).map(|_| ()).unwrap_err(),
        };
        prop_assert!(matches!(err, QopError::Configuration(_)));
        prop_assert!(err.to_string().contains(fem(first_lf).as_str()));
    }
}
