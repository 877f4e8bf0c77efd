//! Program Derived Address (PDA) derivation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump byte whose digest is NOT a valid Ed25519 point. No
//! private key can exist for such an address, so only the owning program can
//! sign for it.

use std::collections::BTreeMap;

use log::{error, trace};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::pubkey::{bytes_are_curve_point, Pubkey};

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8; 21] = b"ProgramDerivedAddress";

/// The result of a successful bump search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedAccount {
    pub address: Pubkey,
    #[serde(serialize_with = "serialize_seeds")]
    pub seeds: Vec<Vec<u8>>,
    pub bump: u8,
}

impl DerivedAccount {
    /// The full seed list a program passes when signing for this address.
    pub fn signer_seeds(&self) -> Vec<Vec<u8>> {
        let mut seeds = self.seeds.clone();
        seeds.push(vec![self.bump]);
        seeds
    }
}

fn serialize_seeds<S: Serializer>(seeds: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(seeds.iter().map(hex::encode))
}

/// Create a PDA from seeds that already include the bump byte.
///
/// Fails with [`SolError::InvalidSeeds`] when the digest lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, SolError> {
    check_seeds(seeds, MAX_SEEDS)?;

    let digest = pda_digest(seeds, &[], program_id);
    if bytes_are_curve_point(&digest) {
        return Err(SolError::InvalidSeeds);
    }

    Ok(Pubkey::new_from_array(digest))
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0 and returns the first result that
/// is NOT a valid Ed25519 point. The seeds must leave room for the bump.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<DerivedAccount, SolError> {
    search_bump(seeds, program_id, |digest| !bytes_are_curve_point(digest))
}

fn search_bump<F>(
    seeds: &[&[u8]],
    program_id: &Pubkey,
    accept: F,
) -> Result<DerivedAccount, SolError>
where
    F: Fn(&[u8; 32]) -> bool,
{
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0u8..=u8::MAX).rev() {
        let digest = pda_digest(seeds, &[bump], program_id);
        if accept(&digest) {
            let address = Pubkey::new_from_array(digest);
            trace!("derived {address} for program {program_id} with bump {bump}");
            return Ok(DerivedAccount {
                address,
                seeds: seeds.iter().map(|s| s.to_vec()).collect(),
                bump,
            });
        }
    }

    let seeds_hex = seeds.iter().map(hex::encode).collect::<Vec<_>>().join(", ");
    error!("bump search exhausted for program {program_id}, seeds [{seeds_hex}]");
    Err(SolError::NoValidBumpFound {
        program_id: program_id.to_string(),
        seeds: seeds_hex,
    })
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), SolError> {
    if seeds.len() > max_seeds {
        return Err(SolError::MaxSeedLengthExceeded(format!(
            "{} seeds exceeds the limit of {max_seeds}",
            seeds.len()
        )));
    }

    if let Some((i, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(SolError::MaxSeedLengthExceeded(format!(
            "seed {i} is {} bytes, limit is {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    Ok(())
}

fn pda_digest(seeds: &[&[u8]], bump_seed: &[u8], program_id: &Pubkey) -> [u8; 32] {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);

    hasher.finalize().into()
}

/// Caller-owned memo of derivations keyed by `(program_id, seeds)`.
///
/// Derivation is pure, so a cached entry is always identical to a fresh one.
/// Failed derivations are not cached.
#[derive(Debug, Default, Clone)]
pub struct PdaCache {
    entries: BTreeMap<(Pubkey, Vec<Vec<u8>>), DerivedAccount>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_derive(
        &mut self,
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<DerivedAccount, SolError> {
        let key = (*program_id, seeds.iter().map(|s| s.to_vec()).collect::<Vec<_>>());
        if let Some(hit) = self.entries.get(&key) {
            return Ok(hit.clone());
        }

        let derived = find_program_address(seeds, program_id)?;
        self.entries.insert(key, derived.clone());
        Ok(derived)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upgradeable_loader() -> Pubkey {
        "BPFLoaderUpgradeab1e11111111111111111111111".parse().unwrap()
    }

    // -- Known vectors from the Solana runtime ------------------------------

    #[test]
    fn create_program_address_known_vectors() {
        let program_id = upgradeable_loader();
        let public_key: Pubkey = "SeedPubey1111111111111111111111111111111111".parse().unwrap();

        let derive = |seeds: &[&[u8]]| create_program_address(seeds, &program_id).unwrap().to_string();

        assert_eq!(derive(&[b"", &[1]]), "BwqrghZA2htAcqq8dzP1WDAhTXYTYWj7CHxF5j7TDBAe");
        assert_eq!(
            derive(&["☉".as_bytes(), &[0]]),
            "13yWmRpaTR4r5nAktwLqMpRNr28tnVUZw26rTvPSSB19"
        );
        assert_eq!(
            derive(&[b"Talking", b"Squirrels"]),
            "2fnQrngrQT4SeLcdToJAD96phoEjNL2man2kfRLCASVk"
        );
        assert_eq!(
            derive(&[public_key.as_ref(), &[1]]),
            "976ymqVnfE32QFe6NfGDctSvVa36LWnvYxhU6G2232YL"
        );
    }

    #[test]
    fn create_program_address_distinguishes_seed_lists() {
        let program_id = upgradeable_loader();
        assert_ne!(
            create_program_address(&[b"Talking", b"Squirrels"], &program_id).unwrap(),
            create_program_address(&[b"Talking"], &program_id).unwrap(),
        );
    }

    #[test]
    fn seed_limits_are_enforced() {
        let program_id = upgradeable_loader();
        let exceeded_seed = &[127u8; MAX_SEED_LEN + 1];
        let max_seed = &[0u8; MAX_SEED_LEN];

        assert!(matches!(
            create_program_address(&[exceeded_seed], &program_id),
            Err(SolError::MaxSeedLengthExceeded(_))
        ));
        assert!(matches!(
            create_program_address(&[b"short_seed", exceeded_seed], &program_id),
            Err(SolError::MaxSeedLengthExceeded(_))
        ));
        assert!(create_program_address(&[max_seed], &program_id).is_ok());

        let seventeen: Vec<[u8; 1]> = (1..=17u8).map(|i| [i]).collect();
        let seeds: Vec<&[u8]> = seventeen.iter().map(|s| s.as_slice()).collect();
        assert!(matches!(
            create_program_address(&seeds, &program_id),
            Err(SolError::MaxSeedLengthExceeded(_))
        ));
    }

    #[test]
    fn find_leaves_room_for_the_bump() {
        let program_id = upgradeable_loader();
        let sixteen: Vec<[u8; 1]> = (1..=16u8).map(|i| [i]).collect();
        let seeds: Vec<&[u8]> = sixteen.iter().map(|s| s.as_slice()).collect();
        assert!(matches!(
            find_program_address(&seeds, &program_id),
            Err(SolError::MaxSeedLengthExceeded(_))
        ));
        assert!(find_program_address(&seeds[..15], &program_id).is_ok());
    }

    // -- Bump search ---------------------------------------------------------

    #[test]
    fn found_address_matches_create_with_bump() {
        let program_id = upgradeable_loader();
        let found = find_program_address(&[b"Lil'", b"Bits"], &program_id).unwrap();

        let recreated =
            create_program_address(&[b"Lil'", b"Bits", &[found.bump]], &program_id).unwrap();
        assert_eq!(found.address, recreated);
        assert!(!found.address.is_on_curve());
    }

    #[test]
    fn found_bump_is_the_highest_valid_one() {
        let program_id = upgradeable_loader();
        let found = find_program_address(&[b"state"], &program_id).unwrap();

        for higher in found.bump.saturating_add(1)..=u8::MAX {
            if higher == found.bump {
                continue;
            }
            assert_eq!(
                create_program_address(&[b"state", &[higher]], &program_id),
                Err(SolError::InvalidSeeds)
            );
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let program_id = Pubkey::new_from_array([0x42; 32]);
        let a = find_program_address(&[b"messages_storage"], &program_id).unwrap();
        let b = find_program_address(&[b"messages_storage"], &program_id).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_programs_derive_off_curve() {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let program_id = Pubkey::new_from_array(bytes);
            let found = find_program_address(&[b"token_vault", &bytes[..8]], &program_id).unwrap();
            assert!(!found.address.is_on_curve());
        }
    }

    #[test]
    fn exhausted_search_reports_seed_context() {
        let program_id = Pubkey::default();
        let err = search_bump(&[b"state"], &program_id, |_| false).unwrap_err();
        assert_eq!(
            err,
            SolError::NoValidBumpFound {
                program_id: "11111111111111111111111111111111".into(),
                seeds: "7374617465".into(),
            }
        );
    }

    #[test]
    fn signer_seeds_append_bump() {
        let program_id = upgradeable_loader();
        let found = find_program_address(&[b"state"], &program_id).unwrap();
        assert_eq!(found.signer_seeds(), vec![b"state".to_vec(), vec![found.bump]]);
    }

    // -- Cache ---------------------------------------------------------------

    #[test]
    fn cache_returns_identical_results() {
        let program_id = upgradeable_loader();
        let mut cache = PdaCache::new();
        assert!(cache.is_empty());

        let first = cache.get_or_derive(&[b"state"], &program_id).unwrap();
        let second = cache.get_or_derive(&[b"state"], &program_id).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, find_program_address(&[b"state"], &program_id).unwrap());
        assert_eq!(cache.len(), 1);

        cache.get_or_derive(&[b"messages_storage"], &program_id).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let mut cache = PdaCache::new();
        let too_long = [0u8; MAX_SEED_LEN + 1];
        assert!(cache.get_or_derive(&[&too_long], &Pubkey::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn derived_account_serializes_seeds_as_hex() {
        let derived = DerivedAccount {
            address: Pubkey::default(),
            seeds: vec![b"state".to_vec()],
            bump: 254,
        };
        let json = serde_json::to_value(&derived).unwrap();
        assert_eq!(json["seeds"][0], "7374617465");
        assert_eq!(json["bump"], 254);
        assert_eq!(json["address"], "11111111111111111111111111111111");
    }
}
