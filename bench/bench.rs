use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};

use collective_pre::{
    decrypt, decrypt_payload, encrypt, encrypt_payload, generate_collective, reencrypt, KeyPair,
    Parameters, PointCodec, ReencryptionState, SecretKey,
};

fn bench_elgamal<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let params = Parameters::new();
    let codec = PointCodec::new(&params);
    let kp = KeyPair::generate(&params);
    let plaintext = codec.encode(42);

    group.bench_function("encrypt", |b| {
        b.iter(|| encrypt(&params, &plaintext, kp.public()))
    });

    let ciphertext = encrypt(&params, &plaintext, kp.public()).unwrap();
    group.bench_function("decrypt", |b| {
        b.iter(|| decrypt(&params, &ciphertext, kp.secret()))
    });
}

fn bench_chain<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let params = Parameters::new();
    let codec = PointCodec::new(&params);
    let delegate = KeyPair::generate(&params);

    // A single step

    let (collective, nodes) = generate_collective(&params, 1).unwrap();
    let ciphertext = encrypt(&params, &codec.encode(42), collective.public_key()).unwrap();
    let state = ReencryptionState::new(&params, &ciphertext, delegate.public()).unwrap();
    group.bench_function("ReencryptionState::step", |b| {
        b.iter(|| state.step(nodes[0].secret()))
    });

    // Whole chains

    for num_nodes in [3usize, 10] {
        let (collective, nodes) = generate_collective(&params, num_nodes).unwrap();
        let ciphertext = encrypt(&params, &codec.encode(42), collective.public_key()).unwrap();
        let keys: Vec<&SecretKey> = nodes.iter().map(|kp| kp.secret()).collect();

        group.bench_with_input(
            BenchmarkId::new("reencrypt", num_nodes),
            &keys,
            |b, keys| {
                b.iter(|| {
                    reencrypt(
                        &params,
                        &ciphertext,
                        keys.iter().cloned(),
                        delegate.public(),
                    )
                })
            },
        );
    }
}

fn bench_decode<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let params = Parameters::new();
    let codec = PointCodec::new(&params);

    for value in [42u64, 1000] {
        let point = codec.encode(value);
        group.bench_with_input(BenchmarkId::new("decode", value), &point, |b, point| {
            b.iter(|| codec.decode(point))
        });
    }
}

fn bench_payload<'a, M: Measurement>(group: &mut BenchmarkGroup<'a, M>) {
    let params = Parameters::new();
    let kp = KeyPair::generate(&params);
    let plaintext = b"peace at dawn";

    group.bench_function("encrypt_payload", |b| {
        b.iter(|| encrypt_payload(&params, kp.public(), &plaintext[..], b""))
    });

    let (key_ciphertext, payload) =
        encrypt_payload(&params, kp.public(), &plaintext[..], b"").unwrap();
    group.bench_function("decrypt_payload", |b| {
        b.iter(|| decrypt_payload(&params, kp.secret(), &key_ciphertext, &payload, b""))
    });
}

fn group_elgamal(c: &mut Criterion) {
    let mut group = c.benchmark_group("ElGamal");
    bench_elgamal(&mut group);
    bench_decode(&mut group);
    group.finish();
}

fn group_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("Re-encryption chain");
    bench_chain(&mut group);
    group.finish();
}

fn group_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("Payload API");
    bench_payload(&mut group);
    group.finish();
}

criterion_group!(benches, group_elgamal, group_chain, group_payload);
criterion_main!(benches);
