//! 标注种类与标注字段取值

use serde::Serialize;
use serde_json::Value;

/// 每条记录都要经过的五种标注
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// 推理复杂度分类
    ReasoningType,
    /// 中译英
    Translation,
    /// 数量关系抽取
    RelationExtraction,
    /// 题型分类
    CategoryTagging,
    /// 知识点打标
    KnowledgeTagging,
}

impl AnnotationKind {
    /// 固定的执行顺序，同步模式按这个顺序逐种处理
    pub const ALL: [AnnotationKind; 5] = [
        AnnotationKind::ReasoningType,
        AnnotationKind::Translation,
        AnnotationKind::RelationExtraction,
        AnnotationKind::CategoryTagging,
        AnnotationKind::KnowledgeTagging,
    ];

    /// 调用失败时替换的值
    pub fn fallback(self) -> Option<String> {
        match self {
            AnnotationKind::ReasoningType => Some("type_error".to_string()),
            _ => None,
        }
    }

    /// 返回文本需要整理成的结构，`None` 表示自由文本原样保留
    pub fn shape(self) -> Option<FieldShape> {
        match self {
            AnnotationKind::RelationExtraction => Some(FieldShape::Mapping),
            AnnotationKind::CategoryTagging | AnnotationKind::KnowledgeTagging => {
                Some(FieldShape::List)
            }
            AnnotationKind::ReasoningType | AnnotationKind::Translation => None,
        }
    }

    /// 写入的记录字段名
    pub fn field_name(self) -> &'static str {
        match self {
            AnnotationKind::ReasoningType => "reasoning_type",
            AnnotationKind::Translation => "en_text",
            AnnotationKind::RelationExtraction => "quantity_relation",
            AnnotationKind::CategoryTagging => "problem_category",
            AnnotationKind::KnowledgeTagging => "knowledge_tag",
        }
    }

    /// 日志里使用的中文名称
    pub fn label(self) -> &'static str {
        match self {
            AnnotationKind::ReasoningType => "推理类型识别",
            AnnotationKind::Translation => "中译英",
            AnnotationKind::RelationExtraction => "数量关系抽取",
            AnnotationKind::CategoryTagging => "题型分类",
            AnnotationKind::KnowledgeTagging => "知识点标记",
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// 整理目标结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    List,
    Mapping,
}

/// 一个标注字段的最终取值
///
/// 序列化时 `Null` 为 `null`，`Parsed` 为解析出的 JSON，`Raw` 为字符串。
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 调用失败且没有兜底值
    #[default]
    Null,
    /// 成功解析的结构化值
    Parsed(Value),
    /// 无法解析、原样保留的文本
    Raw(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_parsed(&self) -> Option<&Value> {
        match self {
            FieldValue::Parsed(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => FieldValue::Raw(text),
            None => FieldValue::Null,
        }
    }
}
