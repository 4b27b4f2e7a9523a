use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use solana_program::ed25519_program;

use crate::DiceError;

// ============================================================================
// RANDOMNESS - Ed25519 Commit-Reveal
// ============================================================================
//
// The player commits by choosing the bet seed; the bet bytes are fixed before
// the house can sign them. Ed25519 signatures are deterministic per
// (key, message), so the house's signature over the bet is the reveal and the
// roll read off it can be recomputed by anyone.
//
// The runtime does not let a program verify Ed25519 directly. The client
// prepends an Ed25519 native program instruction; if that instruction fails
// the whole transaction fails, so all that is left here is to check that it
// verified the expected (key, message, signature) triple.
//
// Ed25519 instruction data layout:
//   num_signatures: u8
//   padding: u8
//   per signature (14 bytes):
//     signature_offset: u16
//     signature_instruction_index: u16
//     public_key_offset: u16
//     public_key_instruction_index: u16
//     message_data_offset: u16
//     message_data_size: u16
//     message_instruction_index: u16
//   ... signatures / public keys / messages ...
// ============================================================================

pub const SIGNATURE_LEN: usize = 64;
pub const PUBKEY_LEN: usize = 32;

const SIGNATURE_OFFSETS_START: usize = 2;
const SIGNATURE_OFFSETS_LEN: usize = 14;

/// Instruction index meaning "data lives in the Ed25519 instruction itself".
const SELF_INSTRUCTION: u16 = u16::MAX;

/// The (key, message, signature) triple an Ed25519 instruction verified.
#[derive(Debug, PartialEq, Eq)]
pub struct Ed25519Proof<'a> {
    pub public_key: &'a [u8],
    pub signature: &'a [u8],
    pub message: &'a [u8],
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn slice(data: &[u8], offset: u16, len: usize) -> Option<&[u8]> {
    let start = offset as usize;
    data.get(start..start.checked_add(len)?)
}

/// Extract the single self-contained signature of an Ed25519 instruction.
pub fn parse_ed25519_instruction(
    ix: &Instruction,
) -> std::result::Result<Ed25519Proof<'_>, &'static str> {
    if ix.program_id != ed25519_program::ID {
        return Err("not an Ed25519 program instruction");
    }
    // The Ed25519 program takes no accounts
    if !ix.accounts.is_empty() {
        return Err("unexpected accounts on Ed25519 instruction");
    }

    let data = ix.data.as_slice();
    match data.first() {
        Some(1) => {}
        Some(_) => return Err("expected exactly one signature"),
        None => return Err("empty Ed25519 instruction"),
    }

    let header = data
        .get(SIGNATURE_OFFSETS_START..SIGNATURE_OFFSETS_START + SIGNATURE_OFFSETS_LEN)
        .ok_or("truncated signature offsets")?;

    let field = |i: usize| read_u16(header, i * 2).ok_or("truncated signature offsets");
    let signature_offset = field(0)?;
    let signature_ix = field(1)?;
    let public_key_offset = field(2)?;
    let public_key_ix = field(3)?;
    let message_offset = field(4)?;
    let message_size = field(5)?;
    let message_ix = field(6)?;

    // Offsets into other instructions would make the data below meaningless
    if signature_ix != SELF_INSTRUCTION
        || public_key_ix != SELF_INSTRUCTION
        || message_ix != SELF_INSTRUCTION
    {
        return Err("signature data must be inline");
    }

    Ok(Ed25519Proof {
        signature: slice(data, signature_offset, SIGNATURE_LEN)
            .ok_or("signature out of bounds")?,
        public_key: slice(data, public_key_offset, PUBKEY_LEN)
            .ok_or("public key out of bounds")?,
        message: slice(data, message_offset, message_size as usize)
            .ok_or("message out of bounds")?,
    })
}

/// Check that `ix` is an Ed25519 verification of `signature` by `signer`
/// over exactly `message`.
pub fn verify_signature_proof(
    ix: &Instruction,
    signer: &Pubkey,
    message: &[u8],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<()> {
    let proof = match parse_ed25519_instruction(ix) {
        Ok(proof) => proof,
        Err(reason) => {
            msg!("Ed25519 proof rejected: {}", reason);
            return err!(DiceError::MissingOrInvalidSignature);
        }
    };

    if proof.public_key != &signer.to_bytes()[..] {
        msg!("Ed25519 proof rejected: signer is not the house");
        return err!(DiceError::MissingOrInvalidSignature);
    }
    if proof.message != message {
        msg!("Ed25519 proof rejected: message is not the bet");
        return err!(DiceError::MissingOrInvalidSignature);
    }
    if proof.signature != signature.as_slice() {
        msg!("Ed25519 proof rejected: signature mismatch");
        return err!(DiceError::MissingOrInvalidSignature);
    }

    Ok(())
}

/// Load the instruction immediately preceding the current one.
pub fn load_previous_instruction(instructions_sysvar: &AccountInfo) -> Result<Instruction> {
    let current = load_current_index_checked(instructions_sysvar)?;
    require!(current > 0, DiceError::MissingOrInvalidSignature);

    load_instruction_at_checked((current - 1) as usize, instructions_sysvar)
        .map_err(|_| error!(DiceError::MissingOrInvalidSignature))
}

/// Roll in `[0, 100)` read off the first 16 bytes of the signature.
pub fn derive_roll(signature: &[u8; SIGNATURE_LEN]) -> u8 {
    let mut prefix = [0u8; 16];
    prefix.copy_from_slice(&signature[..16]);
    (u128::from_le_bytes(prefix) % 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::instruction::AccountMeta;
    use ed25519_dalek::{Signer, SigningKey};

    /// Same layout the web3 `Ed25519Program.createInstructionWithPublicKey`
    /// helper produces: offsets, then pubkey, signature, message.
    fn ed25519_instruction(public_key: &[u8], signature: &[u8], message: &[u8]) -> Instruction {
        let header_len = (SIGNATURE_OFFSETS_START + SIGNATURE_OFFSETS_LEN) as u16;
        let public_key_offset = header_len;
        let signature_offset = public_key_offset + PUBKEY_LEN as u16;
        let message_offset = signature_offset + SIGNATURE_LEN as u16;

        let mut data = vec![1u8, 0u8];
        for v in [
            signature_offset,
            SELF_INSTRUCTION,
            public_key_offset,
            SELF_INSTRUCTION,
            message_offset,
            message.len() as u16,
            SELF_INSTRUCTION,
        ] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(public_key);
        data.extend_from_slice(signature);
        data.extend_from_slice(message);

        Instruction {
            program_id: ed25519_program::ID,
            accounts: vec![],
            data,
        }
    }

    struct Fixture {
        house: Pubkey,
        message: Vec<u8>,
        signature: [u8; SIGNATURE_LEN],
        ix: Instruction,
    }

    fn fixture() -> Fixture {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let house = Pubkey::new_from_array(key.verifying_key().to_bytes());
        let message = b"bet bytes committed by the player".to_vec();
        let signature = key.sign(&message).to_bytes();
        let ix = ed25519_instruction(house.as_ref(), &signature, &message);
        Fixture {
            house,
            message,
            signature,
            ix,
        }
    }

    fn rejected(result: Result<()>) {
        assert_eq!(
            result.unwrap_err(),
            DiceError::MissingOrInvalidSignature.into()
        );
    }

    #[test]
    fn accepts_matching_proof() {
        let f = fixture();
        let proof = parse_ed25519_instruction(&f.ix).unwrap();
        assert_eq!(proof.public_key, &f.house.to_bytes()[..]);
        assert_eq!(proof.message, f.message.as_slice());
        assert_eq!(proof.signature, f.signature.as_slice());

        verify_signature_proof(&f.ix, &f.house, &f.message, &f.signature).unwrap();
    }

    #[test]
    fn rejects_wrong_signer() {
        let f = fixture();
        let other = SigningKey::from_bytes(&[9u8; 32]);
        let other_key = Pubkey::new_from_array(other.verifying_key().to_bytes());
        rejected(verify_signature_proof(&f.ix, &other_key, &f.message, &f.signature));

        // a proof genuinely signed by someone else is no better
        let forged = other.sign(&f.message).to_bytes();
        let ix = ed25519_instruction(other_key.as_ref(), &forged, &f.message);
        rejected(verify_signature_proof(&ix, &f.house, &f.message, &forged));
    }

    #[test]
    fn rejects_different_message() {
        let f = fixture();
        rejected(verify_signature_proof(&f.ix, &f.house, b"another bet", &f.signature));
    }

    #[test]
    fn rejects_different_signature() {
        let f = fixture();
        let mut tampered = f.signature;
        tampered[0] ^= 1;
        rejected(verify_signature_proof(&f.ix, &f.house, &f.message, &tampered));
    }

    #[test]
    fn rejects_other_programs() {
        let mut f = fixture();
        f.ix.program_id = Pubkey::new_unique();
        rejected(verify_signature_proof(&f.ix, &f.house, &f.message, &f.signature));
    }

    #[test]
    fn rejects_accounts_on_instruction() {
        let mut f = fixture();
        f.ix.accounts.push(AccountMeta::new_readonly(Pubkey::new_unique(), false));
        rejected(verify_signature_proof(&f.ix, &f.house, &f.message, &f.signature));
    }

    #[test]
    fn rejects_signature_counts_other_than_one() {
        let mut f = fixture();
        f.ix.data[0] = 2;
        assert_eq!(
            parse_ed25519_instruction(&f.ix).unwrap_err(),
            "expected exactly one signature"
        );
        f.ix.data[0] = 0;
        rejected(verify_signature_proof(&f.ix, &f.house, &f.message, &f.signature));
    }

    #[test]
    fn rejects_data_from_other_instructions() {
        let mut f = fixture();
        // message_instruction_index -> instruction 0
        f.ix.data[14..16].copy_from_slice(&0u16.to_le_bytes());
        assert_eq!(
            parse_ed25519_instruction(&f.ix).unwrap_err(),
            "signature data must be inline"
        );
    }

    #[test]
    fn rejects_truncated_data() {
        let f = fixture();
        for len in [0, 1, 10, 16, 40, f.ix.data.len() - 1] {
            let ix = Instruction {
                program_id: ed25519_program::ID,
                accounts: vec![],
                data: f.ix.data[..len].to_vec(),
            };
            rejected(verify_signature_proof(&ix, &f.house, &f.message, &f.signature));
        }
    }

    #[test]
    fn roll_is_deterministic_and_in_range() {
        let f = fixture();
        let roll = derive_roll(&f.signature);
        assert!(roll < 100);

        // Ed25519 is deterministic: re-signing the same bet gives the same roll
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let again = key.sign(&f.message).to_bytes();
        assert_eq!(again, f.signature);
        assert_eq!(derive_roll(&again), roll);
    }

    #[test]
    fn roll_reads_little_endian_prefix() {
        let mut sig = [0u8; SIGNATURE_LEN];
        assert_eq!(derive_roll(&sig), 0);

        sig[0] = 142;
        assert_eq!(derive_roll(&sig), 42);

        // 256 % 100
        sig[0] = 0;
        sig[1] = 1;
        assert_eq!(derive_roll(&sig), 56);

        // bytes past the prefix do not matter
        sig[16..].fill(0xff);
        assert_eq!(derive_roll(&sig), 56);
    }

    #[test]
    fn rolls_cover_the_whole_range() {
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let mut seen = [false; 100];
        for i in 0u32..2_000 {
            let sig = key.sign(&i.to_le_bytes()).to_bytes();
            seen[derive_roll(&sig) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
