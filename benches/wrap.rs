use criterion::{Criterion, criterion_group, criterion_main};
use kem_bench::asymmetric::{KeyExchangeScheme, MlKemScheme, MlKemWrapMode, RsaOaepScheme};
use kem_bench::symmetric::SymmetricEncryptor;
use std::hint::black_box;

fn bench_rsa(c: &mut Criterion) {
    let scheme = RsaOaepScheme::new();
    let (_sk, der) = RsaOaepScheme::generate_keypair(2048).unwrap();
    let pk = scheme.import_public_key(&der).unwrap();
    let key = [7u8; 32];
    c.bench_function("RSA-2048 OAEP wrap 32B", |b| {
        b.iter(|| scheme.wrap_key(black_box(&pk), black_box(&key)).unwrap());
    });
    c.bench_function("RSA-2048 import SPKI", |b| {
        b.iter(|| scheme.import_public_key(black_box(&der)).unwrap());
    });
}

fn bench_ml_kem(c: &mut Criterion) {
    let (encoded, _sk) = MlKemScheme::generate_keypair();
    let key = [7u8; 32];
    for (name, mode) in [
        ("ML-KEM-768 encapsulate", MlKemWrapMode::EncapsulateOnly),
        ("ML-KEM-768 encapsulate + bind key", MlKemWrapMode::BindSymmetricKey),
    ] {
        let scheme = MlKemScheme::new(mode);
        let pk = scheme.import_public_key(&encoded).unwrap();
        c.bench_function(name, |b| {
            b.iter(|| scheme.wrap_key(black_box(&pk), black_box(&key)).unwrap());
        });
    }
    c.bench_function("ML-KEM-768 keypair", |b| b.iter(MlKemScheme::generate_keypair));
}

fn bench_aes_cbc(c: &mut Criterion) {
    let encryptor = SymmetricEncryptor::new();
    let key = encryptor.generate_key().unwrap();
    let data = vec![0u8; 1024];
    c.bench_function("AES-256-CBC encrypt 1KB", |b| {
        b.iter(|| encryptor.encrypt(black_box(&key), black_box(&data)).unwrap());
    });
}

criterion_group!(benches, bench_rsa, bench_ml_kem, bench_aes_cbc);
criterion_main!(benches);
