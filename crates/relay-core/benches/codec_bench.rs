//! Criterion benchmarks for the relay-core text codec.
//!
//! Measures encoding and decoding latency for each command variant.  The
//! `moveBy` case matters most: a finger on the glass produces a continuous
//! stream of them, so decode latency sits directly on the cursor path.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_core::{
    decode_command, encode_command, encode_response, ClickType, MouseButton, RelayCommand,
    RelayResponse,
};

// ── Command fixtures ──────────────────────────────────────────────────────────

fn make_auth() -> RelayCommand {
    RelayCommand::Auth {
        token: "8f14e45f-ceea-467f-a34e-cbb70f7a2d78".to_string(),
    }
}

fn make_move_to() -> RelayCommand {
    RelayCommand::MoveTo { x: 960.0, y: 540.0 }
}

fn make_move_by() -> RelayCommand {
    RelayCommand::MoveBy { dx: 10.5, dy: -3.2 }
}

fn make_click() -> RelayCommand {
    RelayCommand::Click {
        button: MouseButton::Left,
        click_type: ClickType::Click,
    }
}

fn make_scroll() -> RelayCommand {
    RelayCommand::Scroll { dx: 0.0, dy: -5.0 }
}

fn all_commands() -> Vec<(&'static str, RelayCommand)> {
    vec![
        ("auth", make_auth()),
        ("moveTo", make_move_to()),
        ("moveBy", make_move_by()),
        ("click", make_click()),
        ("scroll", make_scroll()),
    ]
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_command");
    for (name, cmd) in all_commands() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &cmd, |b, cmd| {
            b.iter(|| encode_command(black_box(cmd)).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_command");
    for (name, cmd) in all_commands() {
        let frame = encode_command(&cmd).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &frame, |b, frame| {
            b.iter(|| decode_command(black_box(frame)).unwrap());
        });
    }
    group.finish();
}

fn bench_encode_response(c: &mut Criterion) {
    let resp = RelayResponse::error("Invalid message format");
    c.bench_function("encode_response", |b| {
        b.iter(|| encode_response(black_box(&resp)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_encode_commands,
    bench_decode_commands,
    bench_encode_response
);
criterion_main!(benches);
