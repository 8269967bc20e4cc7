use criterion::{black_box, criterion_group, criterion_main, Criterion};
use go2rs::driver::parse_source;
use go2rs::{translate_source, Ruleset};

fn models_source(count: usize) -> String {
    let mut source = String::from("package models\n\nimport \"time\"\n\n");
    for i in 0..count {
        source.push_str(&format!(
            r#"// Model{i} is a generated record
type Model{i} struct {{
    ID        int64             `json:"id"`
    HTMLURL   string            `json:"html_url"`
    Owner     *User             `json:"owner,omitempty"`
    Labels    map[string]string `json:"labels"`
    Topics    []string          `json:"topics"`
    Created   time.Time         `json:"created_at"`
    Extra     interface{{}}       `json:"extra"`
}}

type State{i} string

"#
        ));
    }
    source
}

fn parse_benchmark(c: &mut Criterion) {
    let source = models_source(50);

    c.bench_function("parse 50 models", |b| {
        b.iter(|| parse_source(black_box(&source)).unwrap())
    });
}

fn translate_benchmark(c: &mut Criterion) {
    let source = models_source(50);
    let ruleset = Ruleset::current();

    c.bench_function("translate 50 models", |b| {
        b.iter(|| translate_source(black_box(&source), &ruleset).unwrap())
    });
}

criterion_group!(benches, parse_benchmark, translate_benchmark);
criterion_main!(benches);
