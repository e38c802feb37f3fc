//! Render queue benchmark: Measure per-unit step cost.
//!
//! Target: < 200ns per grapheme step

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use typecast::{OutputSink, RenderQueue, Transcript};

const MIXED: &str = "Plain ASCII, accents like café, CJK 漢字, and emoji 👍🏽 in one line. ";

fn queue_step_ascii(c: &mut Criterion) {
    let text = "abcdefghij".repeat(100);
    c.bench_function("queue_step_ascii_1k", |b| {
        b.iter(|| {
            let mut queue = RenderQueue::new();
            queue.append(black_box(&text));
            let mut units = 0;
            while queue.step().is_some() {
                units += 1;
            }
            units
        });
    });
}

fn queue_step_mixed_into_transcript(c: &mut Criterion) {
    let text = MIXED.repeat(20);
    c.bench_function("queue_step_mixed_transcript", |b| {
        b.iter(|| {
            let mut queue = RenderQueue::new();
            let mut sink = Transcript::new();
            queue.append(black_box(&text));
            while let Some(unit) = queue.step() {
                sink.emit_text(&unit);
            }
            black_box(sink.unit_count())
        });
    });
}

criterion_group!(benches, queue_step_ascii, queue_step_mixed_into_transcript);
criterion_main!(benches);
