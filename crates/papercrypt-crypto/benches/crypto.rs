use papercrypt_crypto::{gzip_compress, KdfParams, MessageCipher, PassphraseCipher};
use secrecy::SecretString;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bench_cipher() -> PassphraseCipher {
    PassphraseCipher::new(KdfParams {
        mem_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    })
}

#[divan::bench(args = [256, 4096, 65536])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let cipher = bench_cipher();
    let passphrase = SecretString::from("bench passphrase".to_string());
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            cipher
                .encrypt(divan::black_box(&passphrase), divan::black_box(&data))
                .unwrap()
        });
}

#[divan::bench(args = [256, 4096, 65536])]
fn bench_gzip(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| gzip_compress(divan::black_box(&data)).unwrap());
}

fn main() {
    divan::main();
}
