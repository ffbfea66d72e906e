use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use talent_query::lexer::tokenize;
use talent_query::parser::{parse, parse_tokens, ParserOptions};
use talent_query::predicate::{Matcher, PredicateCompiler};
use talent_query::registry::{FieldRegistry, SqlTarget};
use talent_query::sql_compiler::SqlCompiler;

const TEST_CASES: [(&str, &str); 3] = [
    ("simple", "python"),
    ("medium", r#"skill:python city:"Le Mans" -php"#),
    (
        "complex",
        r#"(skill:rust OR skill:go) AND experience:(backend OR "full-stack") AND NOT (country:france OR title:junior*) language:english"#,
    ),
];

// 创建候选人搜索用的字段注册表
fn create_registry() -> FieldRegistry {
    FieldRegistry::builder("candidates", "id")
        .default_target(SqlTarget::column("first_name"))
        .default_target(SqlTarget::column("last_name"))
        .default_target(SqlTarget::column("professional_title"))
        .field("title", vec![SqlTarget::column("professional_title")])
        .field("city", vec![SqlTarget::column("city")])
        .field("country", vec![SqlTarget::column("country")])
        .field("skill", vec![SqlTarget::related("skill", "candidate_id", "name")])
        .field("language", vec![SqlTarget::related("language", "candidate_id", "language")])
        .field(
            "experience",
            vec![
                SqlTarget::related("experience", "candidate_id", "position"),
                SqlTarget::related("experience", "candidate_id", "company_name"),
            ],
        )
        .build()
}

// 基准测试：词法分析性能
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for (name, query) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &query, |b, &query| {
            b.iter(|| black_box(tokenize(black_box(query))))
        });
    }

    group.finish();
}

// 基准测试：语法分析性能
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");

    for (name, query) in TEST_CASES {
        // 预先词法分析
        let tokens = tokenize(query).expect("分词应该成功");

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| match parse_tokens(black_box(tokens), ParserOptions::default()) {
                Ok(ast) => black_box(ast),
                Err(_) => panic!("解析失败"),
            })
        });
    }

    group.finish();
}

// 基准测试：SQL编译性能
fn benchmark_sql_compiler(c: &mut Criterion) {
    let registry = create_registry();
    let compiler = SqlCompiler::new(&registry);
    let mut group = c.benchmark_group("sql_compiler_performance");

    for (name, query) in TEST_CASES {
        let ast = parse(query).expect("解析应该成功");

        group.bench_with_input(BenchmarkId::new("compile", name), &ast, |b, ast| {
            b.iter(|| match compiler.compile(black_box(ast)) {
                Ok(result) => black_box(result),
                Err(_) => panic!("编译失败"),
            })
        });
    }

    group.finish();
}

// 基准测试：谓词编译与匹配
fn benchmark_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_performance");
    let profile = "senior rust backend developer, go, english, lyon";

    for (name, query) in TEST_CASES {
        let ast = parse(query).expect("解析应该成功");

        group.bench_with_input(BenchmarkId::new("compile_and_match", name), &ast, |b, ast| {
            b.iter(|| {
                let matcher = PredicateCompiler::compile(black_box(ast), |term| {
                    let term = term.trim_end_matches('*').to_lowercase();
                    Some(Matcher::<str>::new(move |text| text.contains(term.as_str())))
                });
                black_box(matcher.map(|m| m.matches(profile)))
            })
        });
    }

    group.finish();
}

// 基准测试：完整的端到端处理
fn benchmark_end_to_end(c: &mut Criterion) {
    let registry = create_registry();
    let mut group = c.benchmark_group("end_to_end_performance");

    for (name, query) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("full_pipeline", name), &query, |b, &query| {
            b.iter(|| {
                let ast = parse(black_box(query)).expect("解析应该成功");
                let result = SqlCompiler::new(&registry).compile(&ast).expect("编译应该成功");
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_lexer,
    benchmark_parser,
    benchmark_sql_compiler,
    benchmark_predicate,
    benchmark_end_to_end
);
criterion_main!(benches);
