use crate::chart::{Chart, Modifier};

/// 以其他樣式為 parent 組合出正面樣式，設定標題與圖例
pub fn add(
    chart: &mut Chart,
    style_name: &str,
    references: &[&str],
    title: &str,
    show_legend: bool,
    legend_counter: bool,
    priority: i64,
) {
    let style = chart.style_mut(style_name);
    style.set_priority(priority);
    for reference in references {
        style.add_modifier(Modifier::new().parent(*reference));
    }
    style.plot_title.text.text = title.to_string();
    style.legend.set_shown(show_legend);
    style.legend.add_counter = Some(legend_counter);
}
