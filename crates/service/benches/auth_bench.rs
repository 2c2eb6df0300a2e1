use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::TokenService;
use service::users::dto::{RegisterInput, UserLoginDto};
use service::users::repository::memory::MemoryUserStore;
use service::users::{AccountService, UserService};

fn bench_login(c: &mut Criterion) {
    let tokens = TokenService::new("secret", 3600, "biques", 30);
    let svc = UserService::new(Arc::new(MemoryUserStore::new()), tokens.clone());

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput {
        username: "bench".into(),
        email: "bench@example.com".into(),
        password: "Benchmark1".into(),
        image: None,
        address: None,
        role: None,
    }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(UserLoginDto { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    let token = rt.block_on(svc.login(UserLoginDto { username: "bench".into(), password: "Benchmark1".into() })).unwrap().token;
    c.bench_function("token_verify", |b| {
        b.iter(|| tokens.verify(&token).unwrap());
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
