//! Wallet-side preparation of proof inputs.
//!
//! Turns the balances returned by the contract's `simulateAccounts` into
//! transfer and burn statements, and picks the sender and recipient slots
//! in a shuffled anonymity set.

use crate::abi::Address;
use crate::account::u;
use crate::errors::ProofError;
use crate::group::GroupElement;
use crate::nizk::{
    BurnProof, BurnStatement, BurnWitness, TransferStatement, TransferWitness, ZetherProof,
};
use crate::random::ScalarSource;
use crate::scalar::Scalar;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Encrypted balance `(CL, CR)` of one account
pub type Ciphertext = [GroupElement; 2];

/// Anonymity set with the sender and recipient positions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shuffled {
    #[serde(rename = "y")]
    pub Y: Vec<GroupElement>,
    pub index: [usize; 2],
}

/// Shuffle `me`, `friend` and the decoys, then move the recipient next door
/// if both landed on slots of the same parity.
pub fn shuffle<R: Rng + ?Sized>(
    me: GroupElement,
    friend: GroupElement,
    decoys: &[GroupElement],
    rng: &mut R,
) -> Result<Shuffled, ProofError> {
    let n = decoys.len() + 2;
    if !n.is_power_of_two() {
        return Err(ProofError::InvalidAnonymitySetSize(n));
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut Y = Vec::with_capacity(n);
    let mut index = [0usize; 2];
    for (slot, origin) in order.iter().enumerate() {
        match *origin {
            0 => {
                index[0] = slot;
                Y.push(me);
            }
            1 => {
                index[1] = slot;
                Y.push(friend);
            }
            i => Y.push(decoys[i - 2]),
        }
    }

    if index[0] % 2 == index[1] % 2 {
        let neighbour = if index[1] % 2 == 0 {
            index[1] + 1
        } else {
            index[1] - 1
        };
        Y.swap(index[1], neighbour);
        index[1] = neighbour;
    }
    Ok(Shuffled { Y, index })
}

/// Inputs for a transfer: current balances of every party in `Y`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub epoch: u64,
    pub value: u32,
    pub diff: u32,
    pub sk: Scalar,
    #[serde(rename = "y")]
    pub Y: Vec<GroupElement>,
    pub index: [usize; 2],
    pub accounts: Vec<Ciphertext>,
}

/// Statement and witness for a transfer, plus the sender's epoch nonce
#[derive(Clone, Debug)]
pub struct PreparedTransfer {
    pub statement: TransferStatement,
    pub witness: TransferWitness,
    pub u: GroupElement,
}

/// Everything the contract's `transfer` call needs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub C: Vec<GroupElement>,
    pub D: GroupElement,
    pub u: GroupElement,
    #[serde(rename = "y")]
    pub Y: Vec<GroupElement>,
    pub proof: String,
}

fn unregistered(accounts: &[Ciphertext]) -> usize {
    accounts
        .iter()
        .filter(|account| account[0].is_identity() && account[1].is_identity())
        .count()
}

impl TransferRequest {
    /// Encrypt `-value` to the sender and `value` to the recipient under a
    /// fresh `r`, and add the ciphertexts to the current balances.
    pub fn prepare<S: ScalarSource>(&self, source: &mut S) -> Result<PreparedTransfer, ProofError> {
        let n = self.Y.len();
        if self.accounts.len() != n {
            return Err(ProofError::LengthMismatch);
        }
        let missing = unregistered(&self.accounts);
        if missing > 1 {
            tracing::warn!(missing, "anonymity set contains unregistered accounts");
            return Err(ProofError::UnregisteredAccounts(missing));
        }

        let g = GroupElement::base();
        let r = source.random_scalar(b"r");
        let amount = Scalar::from_u64(self.value as u64);
        let C: Vec<GroupElement> = self
            .Y
            .iter()
            .enumerate()
            .map(|(i, Y_i)| {
                let b = if i == self.index[0] {
                    -amount
                } else if i == self.index[1] {
                    amount
                } else {
                    Scalar::zero()
                };
                g * b + *Y_i * r
            })
            .collect();
        let D = g * r;
        let CLn = self
            .accounts
            .iter()
            .zip(C.iter())
            .map(|([CL, _], C_i)| *CL + *C_i)
            .collect();
        let CRn = self.accounts.iter().map(|[_, CR]| *CR + D).collect();

        Ok(PreparedTransfer {
            statement: TransferStatement {
                CLn,
                CRn,
                C,
                D,
                Y: self.Y.clone(),
                epoch: self.epoch,
            },
            witness: TransferWitness {
                sk: self.sk,
                r,
                b_transfer: self.value,
                b_diff: self.diff,
                index: self.index,
            },
            u: u(self.epoch, &self.sk),
        })
    }

    /// Prepare and prove in one step
    pub fn prove<S: ScalarSource>(&self, source: &mut S) -> Result<TransferResponse, ProofError> {
        let prepared = self.prepare(source)?;
        let proof = ZetherProof::prove(&prepared.statement, &prepared.witness, source)?;
        Ok(TransferResponse {
            C: prepared.statement.C,
            D: prepared.statement.D,
            u: prepared.u,
            Y: prepared.statement.Y,
            proof: proof.serialize(),
        })
    }
}

/// Inputs for a burn: the sender's current balance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnRequest {
    pub accounts: Ciphertext,
    pub epoch: u64,
    pub value: u32,
    pub diff: u32,
    pub sk: Scalar,
    #[serde(rename = "y")]
    pub Y: GroupElement,
    pub sender: Address,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnResponse {
    pub u: GroupElement,
    pub proof: String,
}

impl BurnRequest {
    /// `CLn = CL - g * value`, `CRn = CR`
    pub fn prepare(&self) -> (BurnStatement, BurnWitness) {
        let [CL, CR] = self.accounts;
        let statement = BurnStatement {
            CLn: CL - GroupElement::base() * Scalar::from_u64(self.value as u64),
            CRn: CR,
            Y: self.Y,
            epoch: self.epoch,
            sender: self.sender,
        };
        let witness = BurnWitness {
            sk: self.sk,
            b_diff: self.diff,
        };
        (statement, witness)
    }

    pub fn prove<S: ScalarSource>(&self, source: &mut S) -> BurnResponse {
        let (statement, witness) = self.prepare();
        let proof = BurnProof::prove(&statement, &witness, source);
        BurnResponse {
            u: u(self.epoch, &self.sk),
            proof: proof.serialize(),
        }
    }
}
