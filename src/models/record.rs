use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::annotation::{AnnotationKind, FieldValue};

/// 一道数学文字题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Value,
    pub zh_text: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub equation: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub ans: Option<String>,
    #[serde(default)]
    pub source: String,

    // --- 标注字段 ---
    #[serde(default, skip_deserializing)]
    pub reasoning_type: Option<String>,
    #[serde(default, skip_deserializing)]
    pub en_text: Option<String>,
    #[serde(default, skip_deserializing)]
    pub quantity_relation: FieldValue,
    #[serde(default, skip_deserializing)]
    pub problem_category: FieldValue,
    #[serde(default, skip_deserializing)]
    pub knowledge_tag: FieldValue,

    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub segmented_text: Option<String>,

    /// 其余配置的标准字段，原样透传
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<Value>, zh_text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            zh_text: zh_text.into(),
            equation: None,
            ans: None,
            source: source.into(),
            reasoning_type: None,
            en_text: None,
            quantity_relation: FieldValue::Null,
            problem_category: FieldValue::Null,
            knowledge_tag: FieldValue::Null,
            segmented_text: None,
            extra: Map::new(),
        }
    }

    pub fn with_equation(mut self, equation: impl Into<String>, ans: impl Into<String>) -> Self {
        self.equation = Some(equation.into());
        self.ans = Some(ans.into());
        self
    }

    /// 从已对齐的标准字段行构造记录
    ///
    /// 行里与标注同名的字段会被丢弃，标注结果以本次调用为准。
    pub fn from_row(mut row: Map<String, Value>) -> serde_json::Result<Self> {
        for kind in AnnotationKind::ALL {
            row.remove(kind.field_name());
        }
        row.remove("segmented_text");
        serde_json::from_value(Value::Object(row))
    }
}

/// 字段可能是字符串也可能是数字，统一转成字符串
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, a number or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(TextVisitor)
        }
    }

    deserializer.deserialize_any(TextVisitor)
}
