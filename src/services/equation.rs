//! 方程求值与答案校对
//!
//! 方程统一成 `x=<表达式>` 的形式，对右侧表达式求值后与 `ans` 比较，
//! 不一致时以计算结果为准。无法求值的记录被丢弃。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::DataError;
use crate::models::Record;

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(\.\d+)?)%").unwrap());

/// 百分号、方括号、`^` 统一成可求值的写法
pub fn normalize_expression(equation: &str) -> String {
    PERCENT
        .replace_all(equation, "(${1}/100)")
        .replace('[', "(")
        .replace(']', ")")
        .replace('^', "**")
}

/// 对算术表达式求值
///
/// 支持 `+ - * / **`、括号、正负号和小数；`**` 右结合且优先级高于一元负号。
pub fn evaluate(expression: &str) -> Result<f64, DataError> {
    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("无法识别的字符 '{}'", c)));
    }
    if !value.is_finite() {
        return Err(parser.error("结果不是有限数值"));
    }
    Ok(value)
}

/// 按 `%.6g` 的规则格式化数值
pub fn format_g6(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let scientific = format!("{:.5e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        trim_zeros(&format!("{:.*}", decimals, value))
    }
}

fn trim_zeros(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

/// 校对一条记录的方程和答案
pub fn reconcile_record(mut record: Record) -> Result<Record, DataError> {
    let raw = record.equation.clone().unwrap_or_default();
    let equation = if raw.starts_with("x=") {
        raw
    } else {
        let completed = format!("x={}", raw);
        debug!("补全方程: {} → {}", raw, completed);
        record.equation = Some(completed.clone());
        completed
    };

    let formatted = normalize_expression(&equation);
    let rhs = formatted
        .split_once('=')
        .map(|(_, rhs)| rhs.trim())
        .unwrap_or_default();
    let expected = format_g6(evaluate(rhs)?);

    let ans = record.ans.as_deref().map(str::trim).unwrap_or_default();
    if ans.is_empty() {
        info!("填入计算结果: {} → {}", rhs, expected);
        record.ans = Some(expected);
    } else if ans != expected {
        info!("ans ≠ 实际值，覆盖 ans: {} → {}", ans, expected);
        record.ans = Some(expected);
    } else {
        debug!("表达式和 ans 一致: {} == {}", rhs, ans);
    }

    Ok(record)
}

/// 校对整批记录，无法求值的记录被丢弃
pub fn reconcile(records: Vec<Record>) -> Vec<Record> {
    info!("[postprocess] 开始格式化数学表达式");
    let total = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter_map(|record| match reconcile_record(record) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect();
    info!("[postprocess] 处理完成：{}/{} 条记录", kept.len(), total);
    kept
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DataError {
        DataError::EquationFailed {
            expression: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// 跳过空白后尝试消费 `token`
    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        let len = token.chars().count();
        let matches = self
            .chars
            .get(self.pos..self.pos + len)
            .is_some_and(|slice| slice.iter().copied().eq(token.chars()));
        if matches {
            self.pos += len;
        }
        matches
    }

    fn expr(&mut self) -> Result<f64, DataError> {
        let mut value = self.term()?;
        loop {
            if self.eat("+") {
                value += self.term()?;
            } else if self.eat("-") {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, DataError> {
        let mut value = self.unary()?;
        loop {
            // `**` 先于 `*` 判断，交给 power 处理
            self.skip_whitespace();
            if self.chars.get(self.pos..self.pos + 2) == Some(&['*', '*'][..]) {
                return Ok(value);
            }
            if self.eat("*") {
                value *= self.unary()?;
            } else if self.eat("/") {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(self.error("除数为 0"));
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, DataError> {
        if self.eat("-") {
            return Ok(-self.unary()?);
        }
        if self.eat("+") {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, DataError> {
        let base = self.primary()?;
        if self.eat("**") {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, DataError> {
        if self.eat("(") {
            let value = self.expr()?;
            if !self.eat(")") {
                return Err(self.error("括号不匹配"));
            }
            return Ok(value);
        }
        self.number()
    }

    fn number(&mut self) -> Result<f64, DataError> {
        self.skip_whitespace();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.error(format!("位置 {} 处需要数字，实际为 '{}'", start, c)),
                None => self.error("表达式不完整"),
            });
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| self.error(format!("无效的数字 '{}'", literal)))
    }
}
