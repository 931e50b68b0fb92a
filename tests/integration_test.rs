mod common;

use std::path::Path;

use common::*;
use math_annotation_pipeline::config::{Config, SourceFile, StandardFields};
use math_annotation_pipeline::services::{equation, Exporter, Preprocessor};
use math_annotation_pipeline::{App, ExecutionMode};
use serde_json::{json, Value};

fn standard_fields() -> StandardFields {
    let mut fields = StandardFields::default();
    fields
        .field_aliases
        .insert("original_text".to_string(), "zh_text".to_string());
    fields
        .field_aliases
        .insert("answer".to_string(), "ans".to_string());
    fields
}

const SHOPPING: &str = "妈妈买了3条裙子，每条裙子48元，又买了2双鞋，每双鞋65元，妈妈一共花了多少钱？";
const SHARING: &str = "铅笔盒里有35枝铅笔，老师把这些铅笔平均分给7个同学，每个同学可以分到几枝铅笔？";
const JOURNEY: &str = "甲乙两地相距300千米，一辆汽车从甲地出发，每小时行60千米，几小时可以到达乙地？";
const TEAMWORK: &str = "一项工程甲队单独做10天完成，乙队单独做15天完成，两队合作需要几天才能完成？";

fn write_sources(dir: &Path) -> Vec<SourceFile> {
    let head_body = json!({
        "head": {"name": "ape"},
        "body": [
            {"id": 101, "original_text": SHOPPING, "equation": "3*48+2*65", "answer": ""},
            {"id": 102, "original_text": SHARING, "equation": "x=35/7", "answer": 6},
            {"id": 103, "original_text": "太短的题", "equation": "x=1", "answer": 1},
        ]
    });
    let array = json!([
        {"id": "m-1", "zh_text": JOURNEY, "equation": "x=300/60", "ans": "5"},
        {"id": "m-2", "zh_text": SHOPPING, "equation": "x=3*48+2*65", "ans": "274"},
        {"id": "m-3", "zh_text": TEAMWORK, "equation": "x=1/(1/10+1/15", "ans": "6"},
    ]);
    std::fs::write(dir.join("ape.json"), head_body.to_string()).unwrap();
    std::fs::write(dir.join("math23k.json"), array.to_string()).unwrap();

    vec![
        SourceFile { file: "ape.json".into(), source: "ape210k".into() },
        SourceFile { file: "math23k.json".into(), source: "math23k".into() },
    ]
}

#[tokio::test]
async fn test_pipeline_stages_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sources = write_sources(dir.path());

    // 预处理：短题被筛掉，重复题干只保留第一次出现
    let records = Preprocessor::new(&standard_fields())
        .load_sources(dir.path(), &sources)
        .await;
    let texts: Vec<&str> = records.iter().map(|r| r.zh_text.as_str()).collect();
    assert_eq!(texts, vec![SHOPPING, SHARING, JOURNEY, TEAMWORK]);
    assert_eq!(records[0].source, "ape210k");
    assert_eq!(records[2].source, "math23k");

    let annotated = annotator(ExecutionMode::Async, 4, scripted_reply)
        .annotate(records)
        .await;

    // 校对：补全 x=、填入/修正答案、丢弃括号不匹配的方程
    let reconciled = equation::reconcile(annotated);
    assert_eq!(reconciled.len(), 3);
    assert_eq!(reconciled[0].equation.as_deref(), Some("x=3*48+2*65"));
    assert_eq!(reconciled[0].ans.as_deref(), Some("274"));
    assert_eq!(reconciled[1].ans.as_deref(), Some("5"));
    assert_eq!(reconciled[2].ans.as_deref(), Some("5"));

    let output = dir.path().join("out").join("benchmark.json");
    let exported = Exporter::new()
        .export(reconciled, &sources, &output)
        .await
        .unwrap();
    assert_eq!(exported, 3);

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["head"]["size"], 3);
    assert_eq!(doc["head"]["source"], "ape210k, math23k");
    let body = doc["body"].as_array().unwrap();
    let ids: Vec<&Value> = body.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2), &json!(3)]);
    assert_eq!(body[0]["knowledge_tag"], json!(["乘法", "人民币计算"]));
    assert_eq!(body[0]["quantity_relation"], json!({"总价": "3 * 48"}));
    assert_eq!(body[2]["en_text"], "Translation of problem #1");
    assert!(body[0]["segmented_text"].as_str().unwrap().contains(' '));
}

#[tokio::test]
#[ignore] // 需要真实接口：LLM_API_KEY=... cargo test -- --ignored
async fn test_live_pipeline_run() {
    let config = Config::load("pipeline.toml", None).expect("加载 pipeline.toml 失败");
    let summary = App::new(config).run().await.expect("流水线运行失败");
    println!("{:?}", summary);
    assert!(summary.exported <= summary.loaded);
}
