/// 日志工具模块
///
/// 提供批次处理过程中的日志辅助函数
use crate::config::Config;
use tracing::info;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量情感分类模式");
    info!("📄 输入文件: {}", config.input_file);
    info!("💾 输出文件: {}", config.output_file);
    info!(
        "📊 批次大小: {}，重试次数: {}，两阶段模式: {}",
        config.batch_size, config.max_retries, config.two_stage
    );
    info!("{}", "=".repeat(60));
}

/// 记录输入加载与恢复信息
pub fn log_input_loaded(total: usize, resume_offset: usize) {
    info!("✓ 共 {} 条待分类评论", total);
    if resume_offset > 0 {
        info!("⏩ 检查点已有 {} 行，从该位置继续", resume_offset);
    } else {
        info!("💡 未发现检查点，从头开始处理");
    }
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("💬 本批评论: {}-{} / 共 {} 条", start + 1, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, ok: usize, total: usize, processed: usize, all: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, ok, total);
    info!("📈 总进度: {}/{} 条评论", processed, all);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(ok: usize, failed: usize, total: usize, output_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", ok, total);
    info!("❌ 失败（占位行）: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_file);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
