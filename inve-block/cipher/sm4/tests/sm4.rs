use hex_literal::hex;
use inve_sm4::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use inve_sm4::{Block, Engine, Key, Sm4, BLOCK_SIZE};
use proptest::prelude::*;
use std::{sync::Arc, thread};

const KEY: [u8; 16] = hex!("0123456789abcdeffedcba9876543210");
const PLAINTEXT: [u8; 16] = hex!("0123456789abcdeffedcba9876543210");
const CIPHERTEXT: [u8; 16] = hex!("681edf34d206965e86b3e94f536e4246");

/// Every engine the running CPU can bind.
fn ciphers(key: &[u8; 16]) -> Vec<Sm4> {
    [Engine::Generic, Engine::Accelerated]
        .iter()
        .filter_map(|&engine| Sm4::with_engine(&Key::from(*key), engine))
        .collect()
}

#[test]
fn example_1() {
    for cipher in ciphers(&KEY) {
        let mut block = Block::from(PLAINTEXT);
        cipher.encrypt_block(&mut block);
        assert_eq!(block[..], CIPHERTEXT, "{:?}", cipher.engine());
        cipher.decrypt_block(&mut block);
        assert_eq!(block[..], PLAINTEXT, "{:?}", cipher.engine());
    }
}

#[test]
fn example_2_one_million_rounds() {
    for cipher in ciphers(&KEY) {
        let mut block = Block::from(PLAINTEXT);
        for _ in 0..1_000_000 {
            cipher.encrypt_block(&mut block);
        }
        assert_eq!(
            block[..],
            hex!("595298c7c6fd271f0402f804c33d3f66"),
            "{:?}",
            cipher.engine()
        );
    }
}

#[test]
fn all_zero_key_and_block() {
    for cipher in ciphers(&[0; 16]) {
        let mut block = Block::default();
        cipher.encrypt_block(&mut block);
        assert_eq!(block[..], hex!("9f1f7bff6f5511384d9430531e538fd3"));
    }
}

#[test]
fn rejects_wrong_key_length() {
    assert!(Sm4::new_from_slice(&[0; 15]).is_err());
    assert!(Sm4::new_from_slice(&[0; 17]).is_err());
    assert!(Sm4::new_from_slice(&[]).is_err());
    assert!(Sm4::new_from_slice(&KEY).is_ok());
}

#[test]
fn block_size_is_sixteen() {
    let cipher = Sm4::new(&Key::from(KEY));
    assert_eq!(cipher.block_size(), BLOCK_SIZE);
    assert_eq!(BLOCK_SIZE, 16);
}

#[test]
fn slice_api_touches_first_block_only() {
    for cipher in ciphers(&KEY) {
        let mut src = [0xeeu8; 20];
        src[..16].copy_from_slice(&PLAINTEXT);
        let mut dst = [0x55u8; 24];

        cipher.encrypt(&mut dst, &src);
        assert_eq!(dst[..16], CIPHERTEXT);
        assert!(dst[16..].iter().all(|&b| b == 0x55));

        let mut back = [0u8; 16];
        cipher.decrypt(&mut back, &dst);
        assert_eq!(back, PLAINTEXT);
    }
}

#[test]
fn in_place_matches_out_of_place() {
    for cipher in ciphers(&KEY) {
        let mut buf = PLAINTEXT;
        let mut tmp = [0u8; 16];
        cipher.encrypt(&mut tmp, &buf);
        cipher.encrypt_in_place(&mut buf);
        assert_eq!(buf, tmp);

        cipher.decrypt_in_place(&mut buf);
        assert_eq!(buf, PLAINTEXT);

        let mut shared = [0u8; 48];
        shared[16..32].copy_from_slice(&PLAINTEXT);
        cipher.encrypt_within(&mut shared, 16, 16);
        assert_eq!(shared[16..32], CIPHERTEXT);
        cipher.decrypt_within(&mut shared, 16, 32);
        assert_eq!(shared[32..48], PLAINTEXT);
        assert_eq!(shared[16..32], CIPHERTEXT);
    }
}

#[test]
fn multi_block_calls_match_single_block_calls() {
    for cipher in ciphers(&KEY) {
        // Two full four-block chunks plus a three-block tail.
        let mut blocks = [Block::default(); 11];
        for (i, block) in blocks.iter_mut().enumerate() {
            for (j, b) in block.iter_mut().enumerate() {
                *b = (i * 16 + j) as u8;
            }
        }
        let original = blocks;

        cipher.encrypt_blocks(&mut blocks);
        for (ct, pt) in blocks.iter().zip(original.iter()) {
            let mut expected = *pt;
            cipher.encrypt_block(&mut expected);
            assert_eq!(ct, &expected);
        }

        cipher.decrypt_blocks(&mut blocks);
        assert_eq!(blocks, original);
    }
}

#[test]
fn shared_across_threads() {
    let cipher = Arc::new(Sm4::new(&Key::from(KEY)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cipher = Arc::clone(&cipher);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let mut block = Block::from(PLAINTEXT);
                    cipher.encrypt_block(&mut block);
                    assert_eq!(block[..], CIPHERTEXT);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
#[should_panic(expected = "sm4: input not full block")]
fn encrypt_short_input() {
    Sm4::new(&Key::from(KEY)).encrypt(&mut [0; 16], &[0; 15]);
}

#[test]
#[should_panic(expected = "sm4: output not full block")]
fn encrypt_short_output() {
    Sm4::new(&Key::from(KEY)).encrypt(&mut [0; 15], &[0; 16]);
}

#[test]
#[should_panic(expected = "sm4: input not full block")]
fn decrypt_short_input() {
    Sm4::new(&Key::from(KEY)).decrypt(&mut [0; 16], &[0; 8]);
}

#[test]
#[should_panic(expected = "sm4: output not full block")]
fn decrypt_short_output() {
    Sm4::new(&Key::from(KEY)).decrypt(&mut [], &[0; 16]);
}

#[test]
#[should_panic(expected = "sm4: input not full block")]
fn in_place_short_buffer() {
    Sm4::new(&Key::from(KEY)).encrypt_in_place(&mut [0; 10]);
}

#[test]
#[should_panic(expected = "sm4: invalid buffer overlap")]
fn encrypt_within_partial_overlap() {
    Sm4::new(&Key::from(KEY)).encrypt_within(&mut [0; 32], 0, 8);
}

#[test]
#[should_panic(expected = "sm4: invalid buffer overlap")]
fn decrypt_within_partial_overlap() {
    Sm4::new(&Key::from(KEY)).decrypt_within(&mut [0; 32], 15, 0);
}

#[test]
#[should_panic(expected = "sm4: output not full block")]
fn within_destination_out_of_range() {
    Sm4::new(&Key::from(KEY)).encrypt_within(&mut [0; 32], 0, 17);
}

#[test]
fn send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Sm4>();
}

proptest! {
    #[test]
    fn engines_agree(key in any::<[u8; 16]>(), pt in any::<[u8; 16]>()) {
        let ciphers = ciphers(&key);
        let mut ct = Block::from(pt);
        ciphers[0].encrypt_block(&mut ct);
        for cipher in &ciphers[1..] {
            let mut other = Block::from(pt);
            cipher.encrypt_block(&mut other);
            prop_assert_eq!(other, ct);

            cipher.decrypt_block(&mut other);
            let mut generic = ct;
            ciphers[0].decrypt_block(&mut generic);
            prop_assert_eq!(other, generic);
        }
    }

    #[test]
    fn round_trip(key in any::<[u8; 16]>(), pt in any::<[u8; 16]>()) {
        for cipher in ciphers(&key) {
            let mut ct = [0u8; 16];
            cipher.encrypt(&mut ct, &pt);
            let mut back = [0u8; 16];
            cipher.decrypt(&mut back, &ct);
            prop_assert_eq!(back, pt);
        }
    }

    #[test]
    fn within_rejects_every_partial_overlap(src in 0usize..32, dst in 0usize..32) {
        let cipher = Sm4::new(&Key::from(KEY));
        let mut buf = [0u8; 48];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cipher.encrypt_within(&mut buf, src, dst);
        }));
        let distance = if src > dst { src - dst } else { dst - src };
        prop_assert_eq!(result.is_err(), distance != 0 && distance < BLOCK_SIZE);
    }
}
