//! Performance benchmarks for pipeline conversion
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! These benchmarks measure script and JSON conversion for pipelines with
//! different stage counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pipeline_model::{Converter, ToJson};

/// Generate a pipeline script with the given number of stages
fn generate_pipeline(stage_count: usize) -> String {
    let mut stages = Vec::new();

    for i in 0..stage_count {
        let stage = if i % 4 == 0 {
            // Parallel stage every 4th stage
            format!(
                r#"        stage('stage_{i}') {{
            parallel {{
                stage('left_{i}') {{ steps {{ sh 'make left' }} }}
                stage('right_{i}') {{ steps {{ sh 'make right' }} }}
            }}
        }}"#
            )
        } else if i % 4 == 1 {
            format!(
                r#"        stage('stage_{i}') {{
            when {{ branch 'main' }}
            steps {{
                sh script: 'make test', returnStatus: true
                dir('sub') {{
                    echo 'inside'
                }}
            }}
        }}"#
            )
        } else {
            format!(
                r#"        stage('stage_{i}') {{
            environment {{ STAGE = "{i}" }}
            steps {{
                echo "running ${{env.STAGE}}"
                retry(3) {{
                    sh 'make'
                }}
            }}
        }}"#
            )
        };
        stages.push(stage);
    }

    format!(
        "pipeline {{\n    agent any\n    stages {{\n{}\n    }}\n}}\n",
        stages.join("\n")
    )
}

/// Benchmark script to JSON for different stage counts
fn benchmark_script_to_json(c: &mut Criterion) {
    let stage_counts = vec![10, 50, 100, 250];
    let converter = Converter::default();

    let mut group = c.benchmark_group("script_to_json");
    group.sample_size(20);

    for count in stage_counts {
        let script = generate_pipeline(count);

        group.bench_with_input(BenchmarkId::new("to_json", count), &script, |b, script| {
            b.iter(|| black_box(converter.to_json(black_box(script))));
        });
    }

    group.finish();
}

/// Benchmark JSON back to script
fn benchmark_json_to_script(c: &mut Criterion) {
    let stage_counts = vec![10, 50, 100, 250];
    let converter = Converter::default();

    let mut group = c.benchmark_group("json_to_script");
    group.sample_size(20);

    for count in stage_counts {
        let json = converter
            .to_json(&generate_pipeline(count))
            .json
            .map(|json| json.to_string())
            .unwrap_or_default();

        group.bench_with_input(BenchmarkId::new("to_jenkinsfile", count), &json, |b, json| {
            b.iter(|| black_box(converter.to_jenkinsfile(black_box(json))));
        });
    }

    group.finish();
}

/// Benchmark parsing alone, without validation or rendering
fn benchmark_parsing(c: &mut Criterion) {
    let stage_counts = vec![10, 100, 500];

    let mut group = c.benchmark_group("parsing");

    for count in stage_counts {
        let script = generate_pipeline(count);

        group.bench_with_input(BenchmarkId::new("script", count), &script, |b, script| {
            b.iter(|| {
                let mut errors = pipeline_model::ErrorCollector::new();
                let pipeline = pipeline_model::script_to_pipeline_def(black_box(script), &mut errors)
                    .expect("Parsing should succeed in benchmarks");
                black_box(pipeline.to_json())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_script_to_json,
    benchmark_json_to_script,
    benchmark_parsing
);
criterion_main!(benches);
