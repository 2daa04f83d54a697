//! Entry points for wallets: proofs as `0x` hex strings, accounts and
//! signatures from hex inputs. Randomness comes from a fresh [`RandomTape`].

use crate::abi::Address;
use crate::account::{self, Account, Signature};
use crate::errors::ProofError;
use crate::group::GroupElement;
use crate::nizk::{
    BurnProof, BurnStatement, BurnWitness, TransferStatement, TransferWitness, ZetherProof,
};
use crate::random::RandomTape;
use crate::scalar::Scalar;

pub fn generate_burn_proof(statement: &BurnStatement, witness: &BurnWitness) -> String {
    let mut tape = RandomTape::new(b"burn_proof");
    BurnProof::prove(statement, witness, &mut tape).serialize()
}

pub fn generate_transfer_proof(
    statement: &TransferStatement,
    witness: &TransferWitness,
) -> Result<String, ProofError> {
    let mut tape = RandomTape::new(b"transfer_proof");
    Ok(ZetherProof::prove(statement, witness, &mut tape)?.serialize())
}

/// Decrypted balance, or 0 when it exceeds [`account::B_MAX`]
pub fn read_balance(CL: &GroupElement, CR: &GroupElement, x: &Scalar) -> u64 {
    account::read_balance(CL, CR, x).unwrap_or(0)
}

/// Account for `secret` (reduced into the scalar field), or a fresh one
pub fn create_account(secret: Option<&str>) -> Result<Account, ProofError> {
    match secret.map(str::trim).filter(|s| !s.is_empty()) {
        Some(hex) => Ok(Account::with_secret(Scalar::from_hex(hex)?)),
        None => Ok(Account::generate(&mut RandomTape::new(b"account"))),
    }
}

/// Registration signature over the contract `address`. `random` fixes the
/// nonce; without it a fresh one is drawn.
pub fn sign(address: &str, account: &Account, random: Option<&str>) -> Result<Signature, ProofError> {
    let address = Address::from_hex(address)?;
    match random.map(str::trim).filter(|s| !s.is_empty()) {
        Some(k) => Ok(account::sign_with_nonce(&address, account, &Scalar::from_hex(k)?)),
        None => Ok(account::sign(&address, account, &mut RandomTape::new(b"sign"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{u, verify_signature};

    #[test]
    fn test_create_account_from_secret() {
        let account = create_account(Some("0x2a")).unwrap();
        assert_eq!(account.x, Scalar::from_u64(42));
        assert_eq!(account.Y, GroupElement::base() * account.x);

        let fresh = create_account(None).unwrap();
        assert_eq!(fresh.Y, GroupElement::base() * fresh.x);
        assert!(create_account(Some("")).is_ok());
        assert!(matches!(create_account(Some("0xzz")), Err(ProofError::InvalidHex(_))));
    }

    #[test]
    fn test_sign_with_given_nonce() {
        let account = Account::with_secret(
            Scalar::from_hex("299569ae0ae1d40140fd8d9afc54d2f581a292fd13fe88c7033d488119bb95b7")
                .unwrap(),
        );
        let address = "0xE4920905e06c6B6070477c40B85756ffDa3cD3E6";
        let signature = sign(
            address,
            &account,
            Some("2493a56987e869bbb150c14aff5b2e897d9fe78d6dad8b12c92432473f7e9abd"),
        )
        .unwrap();
        assert_eq!(
            signature.c.to_hex(),
            "0x206db78bfe338ecffd5b2f0606789ff1045bfbf1e46c897f8fa2e2115e19ed74"
        );

        let random = sign(address, &account, None).unwrap();
        assert!(verify_signature(&Address::from_hex(address).unwrap(), &account.Y, &random));
        assert!(matches!(
            sign("0x12", &account, None),
            Err(ProofError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_read_balance() {
        let account = Account::with_secret(Scalar::from_u64(3));
        let r = Scalar::from_u64(8);
        let CL = GroupElement::base() * Scalar::from_u64(6) + account.Y * r;
        let CR = GroupElement::base() * r;
        assert_eq!(read_balance(&CL, &CR, &account.x), 6);

        // g * (-1) decrypts to q - 1, far beyond the search bound
        let negative = GroupElement::base() * -Scalar::one() + account.Y * r;
        assert_eq!(account::read_balance_bounded(&negative, &CR, &account.x, 1000), None);
    }

    #[test]
    fn test_generated_proofs_verify() {
        let account = Account::with_secret(Scalar::from_u64(21));
        let g = GroupElement::base();
        let r = Scalar::from_u64(2);
        let statement = BurnStatement {
            CLn: g * Scalar::from_u64(4) + account.Y * r,
            CRn: g * r,
            Y: account.Y,
            epoch: 5,
            sender: Address([3; 20]),
        };
        let witness = BurnWitness {
            sk: account.x,
            b_diff: 4,
        };
        let proof = BurnProof::from_hex(&generate_burn_proof(&statement, &witness)).unwrap();
        assert!(proof.verify(&statement, &u(5, &account.x)).is_ok());

        let bad = TransferStatement {
            CLn: vec![g; 3],
            CRn: vec![g; 3],
            C: vec![g; 3],
            D: g,
            Y: vec![g; 3],
            epoch: 5,
        };
        let transfer_witness = TransferWitness {
            sk: account.x,
            r,
            b_transfer: 1,
            b_diff: 1,
            index: [0, 1],
        };
        assert_eq!(
            generate_transfer_proof(&bad, &transfer_witness),
            Err(ProofError::InvalidAnonymitySetSize(3))
        );
    }
}
