//! 配置校验模块
//!
//! 校验规则：
//! - buffer_size >= 1, sinks.queue_capacity >= 1 (字段规则)
//! - sinks.file.filename_prefix / sinks.file.path 非空
//! - queue 数据源：至少一个 broker，broker 地址非空，topic 与 group_id 必填

use contracts::{ContractError, ShipperConfig, SourceKind};
use validator::Validate;

/// 校验 ShipperConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ShipperConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_source(config)?;
    validate_file_sink(config)?;
    Ok(())
}

/// 派生的字段级规则
fn validate_fields(config: &ShipperConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let mut fields: Vec<_> = errors.errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        ContractError::config_validation(fields.join(", "), errors.to_string())
    })
}

/// 按后端校验数据源配置
fn validate_source(config: &ShipperConfig) -> Result<(), ContractError> {
    let source = &config.source;
    if source.kind != SourceKind::Queue {
        return Ok(());
    }

    if source.brokers.is_empty() {
        return Err(ContractError::config_validation(
            "source.brokers",
            "queue source requires at least one broker",
        ));
    }
    if let Some(idx) = source.brokers.iter().position(|b| b.trim().is_empty()) {
        return Err(ContractError::config_validation(
            format!("source.brokers[{idx}]"),
            "broker address cannot be empty",
        ));
    }
    if source.topic.trim().is_empty() {
        return Err(ContractError::config_validation(
            "source.topic",
            "queue source requires a topic",
        ));
    }
    if source.group_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "source.group_id",
            "group_id cannot be empty",
        ));
    }
    Ok(())
}

/// 校验文件 sink 配置 (字段属性无法表达的部分)
fn validate_file_sink(config: &ShipperConfig) -> Result<(), ContractError> {
    if let Some(file) = &config.sinks.file {
        if file.path.trim().is_empty() {
            return Err(ContractError::config_validation(
                "sinks.file.path",
                "file sink path cannot be empty",
            ));
        }
    }
    Ok(())
}
