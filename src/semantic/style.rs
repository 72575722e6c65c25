use crate::chart::{Chart, Modifier, Selector};
use crate::semantic::StyleNames;

/// 只有一個修飾器的樣式
pub fn style_with_one_modifier(
    chart: &mut Chart,
    style_name: &str,
    selector: Selector,
    modifier: Modifier,
    priority: i64,
) -> StyleNames {
    chart
        .style_mut(style_name)
        .set_priority(priority)
        .add_modifier(modifier.selector(selector));
    StyleNames::from([style_name.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_chart::sample;
    use crate::chart::Only;

    #[test]
    fn test_one_modifier() {
        let mut chart = sample();
        style_with_one_modifier(
            &mut chart,
            "-new",
            Selector::new().attribute("new", 1),
            Modifier::new().fill("red").only(Only::Antigens),
            500,
        );
        let new_style = &chart.styles()["-new"];
        assert_eq!(new_style.priority, 500);
        assert_eq!(new_style.modifiers[0].selector, Some(Selector::new().attribute("new", 1)));
    }
}
