// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use eos_signer_core::{
    apdu::{self, prelude::*},
    asset::{Asset as TokenAsset, Symbol},
    consts::*,
    engine::{
        Action, ActionCommon, ConfirmKind, Delegate, Engine, Error, PermissionLevel as Level,
        Refund, State, Transfer, TxHeader as Header, TxSignature, Undelegate, Unknown,
    },
    name::Name,
};

mod helpers;
use helpers::*;

const ALICE: Name = Name::from_const("alice");
const BOB: Name = Name::from_const("bob");
const ACTIVE: Name = Name::from_const("active");

const EXPIRATION: u32 = 1_700_000_000;
const MEMO: &[u8] = b"test memo";

fn header() -> Header {
    Header {
        expiration: EXPIRATION,
        ref_block_num: 0x1234,
        ref_block_prefix: 0xdeadbeef,
        ..Default::default()
    }
}

fn engine() -> anyhow::Result<Engine<TestDriver>> {
    init_logging();

    let mut e = Engine::new(TestDriver::from_mnemonic()?);
    e.unlock();
    Ok(e)
}

fn transfer() -> anyhow::Result<(ActionCommon, Action<'static>)> {
    let common = ActionCommon::new(EOSIO_TOKEN, TRANSFER, &[Level::new(ALICE, ACTIVE)])?;
    let action = Action::Transfer(Transfer {
        sender: ALICE,
        receiver: BOB,
        quantity: TokenAsset::new(765432100, Symbol::new(4, "EOS")),
        memo: MEMO,
    });
    Ok((common, action))
}

/// Serialise the transaction prefix (chain id, header, single action count)
fn preimage_prefix() -> Vec<u8> {
    preimage_prefix_n(1)
}

/// Serialise the transaction prefix with `num_actions` actions (< 128)
fn preimage_prefix_n(num_actions: u8) -> Vec<u8> {
    let mut b = chain_id().to_vec();
    b.extend_from_slice(&EXPIRATION.to_le_bytes());
    b.extend_from_slice(&0x1234u16.to_le_bytes());
    b.extend_from_slice(&0xdeadbeefu32.to_le_bytes());
    // net words, cpu ms, delay, context free actions, action count
    b.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, num_actions]);
    b
}

/// Serialise the transaction trailer (extensions, context free data digest)
fn preimage_trailer(b: &mut Vec<u8>) {
    b.push(0x00);
    b.extend_from_slice(&[0u8; 32]);
}

/// Independently serialise the alice -> bob transfer transaction
fn transfer_preimage() -> Vec<u8> {
    let mut b = preimage_prefix();

    // eosio.token::transfer, authorised by alice@active
    b.extend_from_slice(&0x5530ea033482a600u64.to_le_bytes());
    b.extend_from_slice(&0xcdcd3c2d57000000u64.to_le_bytes());
    b.push(0x01);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3232eda800000000u64.to_le_bytes());

    b.push(8 + 8 + 16 + 1 + MEMO.len() as u8);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3d0e000000000000u64.to_le_bytes());
    b.extend_from_slice(&765432100i64.to_le_bytes());
    b.extend_from_slice(&[4, b'E', b'O', b'S', 0, 0, 0, 0]);
    b.push(MEMO.len() as u8);
    b.extend_from_slice(MEMO);

    preimage_trailer(&mut b);
    b
}

/// Check a signature is canonical and recovers to the expected key
fn check_signature(sig: &TxSignature) -> anyhow::Result<()> {
    assert_eq!(sig.r[0] & 0x80, 0, "r high bit set");
    assert_eq!(sig.s[0] & 0x80, 0, "s high bit set");
    assert!(sig.v < 2);

    let seed = TestDriver::from_mnemonic()?.seed;
    let secret = derive_secret(&seed, &EOS_PATH);
    let expected = *SigningKey::from_slice(&secret).unwrap().verifying_key();

    let signature = Signature::from_slice(&[sig.r, sig.s].concat()).unwrap();
    assert!(signature.normalize_s().is_none(), "signature is not low-S");

    let recid = RecoveryId::from_byte(sig.v).unwrap();
    let recovered = VerifyingKey::recover_from_prehash(&sig.digest, &signature, recid).unwrap();

    assert_eq!(recovered, expected);

    Ok(())
}

#[test]
fn sign_transfer() -> anyhow::Result<()> {
    let mut e = engine()?;

    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;
    assert_eq!(e.state(), State::Active(1));

    let (common, action) = transfer()?;
    assert_eq!(e.compile_action(&common, &action)?, 0);
    assert_eq!(e.state(), State::Finished);

    let sig = e.sign()?;
    assert_eq!(e.state(), State::Complete);

    let expected: [u8; 32] = Sha256::digest(transfer_preimage()).into();
    assert_eq!(sig.digest, expected);

    check_signature(&sig)?;

    let prompts = &e.driver().prompts;
    assert_eq!(prompts.len(), 3);

    assert_eq!(prompts[0].0, ConfirmKind::Action);
    assert_eq!(
        prompts[0].2,
        "Do you want to send 76543.2100 EOS from alice to bob?"
    );

    assert_eq!(prompts[1].0, ConfirmKind::Budget);
    assert_eq!(
        prompts[1].2,
        "You may be billed for:\nWARNING: Unlimited NET\nWARNING: Unlimited CPU"
    );

    assert_eq!(prompts[2].0, ConfirmKind::SignTx);
    assert_eq!(
        prompts[2].2,
        "Do you want to sign this EOS transaction?\nExpiry: Tue Nov 14 22:13:20 2023 UTC\nDelay: 0h00m00s"
    );

    Ok(())
}

/// Minimal transfer, zero chain id and expiry with an empty memo
#[test]
fn sign_minimal_transfer() -> anyhow::Result<()> {
    let mut e = engine()?;

    e.init(&[0u8; 32], &Header::default(), 1, &EOS_PATH)?;

    let common = ActionCommon::new(EOSIO_TOKEN, TRANSFER, &[Level::new(ALICE, ACTIVE)])?;
    let action = Action::Transfer(Transfer {
        sender: ALICE,
        receiver: BOB,
        quantity: TokenAsset::new(765432100, Symbol::new(4, "EOS")),
        memo: b"",
    });
    assert_eq!(e.compile_action(&common, &action)?, 0);
    assert!(e.is_finished());

    let sig = e.sign()?;
    check_signature(&sig)?;

    assert!(e.driver().prompts[2]
        .2
        .contains("Expiry: Thu Jan  1 00:00:00 1970 UTC"));

    Ok(())
}

#[test]
fn signing_is_deterministic() -> anyhow::Result<()> {
    let mut sigs = vec![];

    for _i in 0..2 {
        let mut e = engine()?;
        e.init(&chain_id(), &header(), 1, &EOS_PATH)?;

        let (common, action) = transfer()?;
        e.compile_action(&common, &action)?;
        sigs.push(e.sign()?);
    }

    assert_eq!(sigs[0], sigs[1]);

    Ok(())
}

#[test]
fn sign_transfer_apdu() -> anyhow::Result<()> {
    let mut e = engine()?;
    let mut buff = [0u8; 256];

    let wire_header = apdu::tx::TxHeader {
        expiration: EXPIRATION,
        ref_block_num: 0x1234,
        ref_block_prefix: 0xdeadbeef,
        ..Default::default()
    };

    let req = SignTx::new(chain_id(), wire_header, 1, &EOS_PATH).unwrap();
    let info: TxInfo = exchange(&mut e, &req, &mut buff)?;
    assert_eq!(info, TxInfo::new(TxState::Actions, 1));

    let req = TxActionAck::new(
        EOSIO_TOKEN.value(),
        TRANSFER.value(),
        &[PermissionLevel {
            actor: ALICE.value(),
            permission: ACTIVE.value(),
        }],
        ActionPayload::Transfer {
            sender: ALICE.value(),
            receiver: BOB.value(),
            quantity: Asset {
                amount: 765432100,
                symbol: Symbol::new(4, "EOS").value(),
            },
            memo: MEMO,
        },
    )
    .unwrap();
    let signed: SignedTx = exchange(&mut e, &req, &mut buff)?;

    let expected: [u8; 32] = Sha256::digest(transfer_preimage()).into();
    assert_eq!(signed.digest, expected);

    check_signature(&TxSignature {
        digest: signed.digest,
        r: signed.r,
        s: signed.s,
        v: signed.v,
    })?;

    // Session state is reported following completion
    let n = e.apdu(TxInfoReq::INS, &[], &mut buff)?;
    let (info, _) = TxInfo::decode(&buff[..n]).unwrap();
    assert_eq!(info, TxInfo::new(TxState::TxComplete, 0));

    Ok(())
}

#[test]
fn extra_action_fails() -> anyhow::Result<()> {
    let mut e = engine()?;
    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;

    let (common, action) = transfer()?;
    assert_eq!(e.compile_action(&common, &action)?, 0);

    assert_eq!(
        e.compile_action(&common, &action),
        Err(Error::ActionsExhausted)
    );
    assert!(!e.is_initialized());
    assert_eq!(e.sign(), Err(Error::NotInitialized));

    Ok(())
}

#[test]
fn unknown_action_requires_policy() -> anyhow::Result<()> {
    let data = [0xa5u8; 20];
    let common = ActionCommon::new(
        Name::from_const("eosio.msig"),
        Name::from_const("approve"),
        &[Level::new(ALICE, ACTIVE)],
    )?;
    let action = Action::Unknown(Unknown { data: &data });

    // Rejected where advanced mode is disabled
    let mut e = engine()?;
    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;

    assert_eq!(e.compile_action(&common, &action), Err(Error::Cancelled));
    assert!(!e.is_initialized());
    assert_eq!(e.driver().prompts[0].0, ConfirmKind::Warning);

    // And signed where enabled
    let mut e = engine()?;
    e.driver().advanced = true;
    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;

    assert_eq!(e.compile_action(&common, &action)?, 0);
    let sig = e.sign()?;

    let prompt = &e.driver().prompts[0];
    assert_eq!(prompt.0, ConfirmKind::Action);
    assert_eq!(prompt.1, "eosio.msig:approve");
    assert!(prompt.2.starts_with("20:"));

    let mut b = preimage_prefix();
    b.extend_from_slice(&Name::from_const("eosio.msig").value().to_le_bytes());
    b.extend_from_slice(&Name::from_const("approve").value().to_le_bytes());
    b.push(0x01);
    b.extend_from_slice(&ALICE.value().to_le_bytes());
    b.extend_from_slice(&ACTIVE.value().to_le_bytes());
    b.push(data.len() as u8);
    b.extend_from_slice(&data);
    preimage_trailer(&mut b);

    let expected: [u8; 32] = Sha256::digest(&b).into();
    assert_eq!(sig.digest, expected);

    check_signature(&sig)?;

    Ok(())
}

#[test]
fn budget_rejection_aborts() -> anyhow::Result<()> {
    let mut e = engine()?;
    e.driver().answer(&[true, false]);

    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;

    let (common, action) = transfer()?;
    assert_eq!(e.compile_action(&common, &action)?, 0);

    assert_eq!(e.sign(), Err(Error::Cancelled));
    assert!(!e.is_initialized());
    assert_eq!(e.state(), State::Error);

    // Signing prompt is never shown
    assert_eq!(e.driver().prompts.len(), 2);

    // Engine recovers for the next transaction
    e.init(&chain_id(), &header(), 1, &EOS_PATH)?;
    assert_eq!(e.state(), State::Active(1));

    Ok(())
}

#[test]
fn abort_apdu() -> anyhow::Result<()> {
    let mut e = engine()?;
    let mut buff = [0u8; 256];

    e.init(&chain_id(), &header(), 2, &EOS_PATH)?;

    let n = e.apdu(TxAbort::INS, &[], &mut buff)?;
    let (info, _) = TxInfo::decode(&buff[..n]).unwrap();
    assert_eq!(info, TxInfo::new(TxState::Init, 0));
    assert!(!e.is_initialized());

    Ok(())
}

/// Serialise an eosio system action header authorised by alice@active
fn system_action_preimage(b: &mut Vec<u8>, name: u64, data_len: u8) {
    b.extend_from_slice(&0x5530ea0000000000u64.to_le_bytes());
    b.extend_from_slice(&name.to_le_bytes());
    b.push(0x01);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3232eda800000000u64.to_le_bytes());
    b.push(data_len);
}

#[test]
fn sign_multi_action() -> anyhow::Result<()> {
    const EOS: [u8; 8] = [4, b'E', b'O', b'S', 0, 0, 0, 0];

    let mut e = engine()?;
    e.init(&chain_id(), &header(), 4, &EOS_PATH)?;

    let auth = [Level::new(ALICE, ACTIVE)];
    let net = TokenAsset::new(10000, Symbol::new(4, "EOS"));
    let cpu = TokenAsset::new(25000, Symbol::new(4, "EOS"));

    let actions = [
        transfer()?,
        (
            ActionCommon::new(EOSIO, DELEGATEBW, &auth)?,
            Action::Delegate(Delegate {
                sender: ALICE,
                receiver: BOB,
                net_quantity: net,
                cpu_quantity: cpu,
                transfer: true,
            }),
        ),
        (
            ActionCommon::new(EOSIO, UNDELEGATEBW, &auth)?,
            Action::Undelegate(Undelegate {
                sender: ALICE,
                receiver: BOB,
                net_quantity: net,
                cpu_quantity: cpu,
            }),
        ),
        (
            ActionCommon::new(EOSIO, REFUND, &auth)?,
            Action::Refund(Refund { owner: ALICE }),
        ),
    ];

    for (i, (common, action)) in actions.iter().enumerate() {
        assert_eq!(e.state(), State::Active(4 - i as u32));
        assert_eq!(e.compile_action(common, action)?, 3 - i as u32);
    }
    assert!(e.is_finished());

    let sig = e.sign()?;

    let mut b = preimage_prefix_n(4);

    // eosio.token::transfer
    b.extend_from_slice(&0x5530ea033482a600u64.to_le_bytes());
    b.extend_from_slice(&0xcdcd3c2d57000000u64.to_le_bytes());
    b.push(0x01);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3232eda800000000u64.to_le_bytes());
    b.push(42);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3d0e000000000000u64.to_le_bytes());
    b.extend_from_slice(&765432100i64.to_le_bytes());
    b.extend_from_slice(&EOS);
    b.push(MEMO.len() as u8);
    b.extend_from_slice(MEMO);

    // eosio::delegatebw, NET before CPU then the transfer flag
    system_action_preimage(&mut b, 0x4aa2a61b2a3f0000, 49);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3d0e000000000000u64.to_le_bytes());
    b.extend_from_slice(&10000i64.to_le_bytes());
    b.extend_from_slice(&EOS);
    b.extend_from_slice(&25000i64.to_le_bytes());
    b.extend_from_slice(&EOS);
    b.push(0x01);

    // eosio::undelegatebw
    system_action_preimage(&mut b, 0xd4d2a8a986ca8fc0, 48);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
    b.extend_from_slice(&0x3d0e000000000000u64.to_le_bytes());
    b.extend_from_slice(&10000i64.to_le_bytes());
    b.extend_from_slice(&EOS);
    b.extend_from_slice(&25000i64.to_le_bytes());
    b.extend_from_slice(&EOS);

    // eosio::refund
    system_action_preimage(&mut b, 0xba97a9a400000000, 8);
    b.extend_from_slice(&0x345c850000000000u64.to_le_bytes());

    preimage_trailer(&mut b);

    let expected: [u8; 32] = Sha256::digest(&b).into();
    assert_eq!(sig.digest, expected);

    check_signature(&sig)?;

    // Action prompts in order, then budget and signing
    let prompts: Vec<_> = e
        .driver()
        .prompts
        .iter()
        .map(|(k, t, _)| (*k, t.as_str()))
        .collect();
    assert_eq!(
        prompts,
        &[
            (ConfirmKind::Action, "Transfer"),
            (ConfirmKind::Action, "Delegate"),
            (ConfirmKind::Action, "Undelegate"),
            (ConfirmKind::Action, "Refund"),
            (ConfirmKind::Budget, "Confirm Budget"),
            (ConfirmKind::SignTx, "Sign Transaction"),
        ]
    );
    assert!(e.driver().prompts[1].2.starts_with("Do you want to transfer resources"));

    Ok(())
}

#[test]
fn get_public_key_apdu() -> anyhow::Result<()> {
    let mut e = engine()?;
    let mut buff = [0u8; 256];

    let secret = derive_secret(&TestDriver::from_mnemonic()?.seed, &EOS_PATH);
    let expected = SigningKey::from_slice(&secret)
        .unwrap()
        .verifying_key()
        .to_encoded_point(true);

    for (kind, prefix) in [(PublicKeyKind::Eos, "EOS"), (PublicKeyKind::EosK1, "EOS_K1_")] {
        let req = PublicKeyReq::new(kind, true, &EOS_PATH).unwrap();
        let resp: PublicKeyResp = exchange(&mut e, &req, &mut buff)?;

        assert_eq!(resp.proto_version, apdu::EOS_PROTO_VERSION);
        assert_eq!(resp.kind, kind);
        assert_eq!(&resp.public_key[..], expected.as_bytes());

        // Base58 key with a ripemd160 checksum
        let key_str = resp.key_str.as_str();
        assert!(key_str.starts_with(prefix));

        let mut raw = [0u8; 37];
        let n = bs58::decode(&key_str[prefix.len()..])
            .into(&mut raw[..])
            .unwrap();
        assert_eq!(n, 37);
        assert_eq!(&raw[..33], expected.as_bytes());

        let checksum = ripemd::Ripemd160::digest(&raw[..33]);
        assert_eq!(&raw[33..], &checksum[..4]);
    }

    let prompts = &e.driver().prompts;
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].0, ConfirmKind::PublicKey);

    // secp256r1 keys are not supported
    let req = PublicKeyReq::new(PublicKeyKind::EosR1, false, &EOS_PATH).unwrap();
    assert_eq!(
        exchange::<_, PublicKeyResp>(&mut e, &req, &mut buff),
        Err(Error::UnsupportedKey)
    );

    Ok(())
}
