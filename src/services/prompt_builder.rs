//! 标注提示词
//!
//! 五种标注各有一个模板，题型与知识点的候选标签来自配置。

use crate::config::PromptLabels;
use crate::models::AnnotationKind;

/// 提示词构建器
pub struct PromptBuilder {
    /// 已渲染成 JSON 数组文本的题型候选
    problem_categories: String,
    /// 已渲染成 JSON 数组文本的知识点候选
    knowledge_tags: String,
}

impl PromptBuilder {
    pub fn new(labels: &PromptLabels) -> Self {
        Self {
            problem_categories: render_labels(&labels.problem_categories),
            knowledge_tags: render_labels(&labels.knowledge_tags),
        }
    }

    /// 渲染某种标注对某道题的完整提示词
    pub fn render(&self, kind: AnnotationKind, zh_text: &str) -> String {
        match kind {
            AnnotationKind::ReasoningType => reasoning_prompt(zh_text),
            AnnotationKind::Translation => translation_prompt(zh_text),
            AnnotationKind::RelationExtraction => relation_prompt(zh_text),
            AnnotationKind::CategoryTagging => category_prompt(&self.problem_categories, zh_text),
            AnnotationKind::KnowledgeTagging => knowledge_prompt(&self.knowledge_tags, zh_text),
        }
    }
}

fn render_labels(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

fn reasoning_prompt(zh_text: &str) -> String {
    format!(
        r#"你是一位精通数学文字题的专家，请根据题目解答过程的推理复杂程度对数学文字题进行分类。分类标准如下：
type_1(简单计算)：没有隐含关系，只需简单加减乘除计算即可解题。
type_2(单步公式)：可以直接使用数学公式，或者只需进行一步简单转换即可解决。
type_3(多步公式)：需要使用数学公式，并且必须经过多步转换才能解决。
数学题内容: "{}"
分类选项: [type_1, type_2, type_3]
请只选择最接近的一个分类，并直接输出分类标签。"#,
        zh_text
    )
}

fn translation_prompt(zh_text: &str) -> String {
    format!(
        "你是一个擅长将中文翻译成英文的专家，你的任务只是翻译，不要解答题目。请将以下中文翻译成英文:\n{}",
        zh_text
    )
}

fn relation_prompt(zh_text: &str) -> String {
    format!(
        r#"你作为一个数量关系抽取器，从题目中提取实体之间的数量关系，不要解答题目。
请确保提取的关系清晰、准确且格式一致，只需直接输出题目文本对应的数量关系即可。

示例：
题目：一个果园的李树棵数是桃树的 7/8，桃树棵数是梨树的 5/6。已知李树有1680棵，梨树有多少棵？
输出："李树棵数是桃树的 7/8":"李树 = 桃树 * 7/8","桃树棵数是梨树的 5/6":"桃树 = 梨树 * 5/6","李树有 1680 棵":"李树 = 1680","梨树有多少棵?":"梨树 = X"
题目：用棱长为3 cm正方体塑料拼插积木在广场中心搭建起一面长6 m，高2.7 m，厚6 cm的奥运中心墙，算一下这个墙用了多少积木？
输出："棱长为3 cm正方体塑料拼插积木":"积木棱长 = 3 cm，积木体积 = 棱长 * 棱长 * 棱长","长6 m":"墙的长度 = 6 m = 600 cm","高2.7 m":"墙的高度 = 2.7 m = 270 cm","厚6 cm":"墙的厚度 = 6 cm","这个墙用了多少积木":"墙的体积 = 长度 * 高度 * 厚度，积木数量 = 墙的体积 / 积木体积"

题目：{}"#,
        zh_text
    )
}

fn category_prompt(categories: &str, zh_text: &str) -> String {
    format!(
        r#"你是一位资深小学数学专家，擅长对题目进行结构化分类。请根据题干列出该题目所属的类型（可多选）。
请从以下问题分类中选择最接近的一个或多个，并以 JSON 数组直接输出：{}

示例：
题目：小明和小红从家出发，分别以每小时 4 千米和 3 千米的速度迎面而行，2 小时后相遇。他们家之间相距多少千米？
输出：["行程类"]

题目：{}"#,
        categories, zh_text
    )
}

fn knowledge_prompt(tags: &str, zh_text: &str) -> String {
    format!(
        r#"你是一位小学数学教师，擅长分析题目所涉及的数学知识点。请根据题干列出其中涵盖的数学知识点（可多选）。
请从以下知识点标签中选择最接近的一个或多个，并以 JSON 数组直接输出：{}

示例：
题目：妈妈买了 3 条裙子，每条裙子 48 元，一共花了多少钱？
输出：["乘法", "人民币计算"]

题目：{}"#,
        tags, zh_text
    )
}
