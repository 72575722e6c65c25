use crate::chart::{Chart, Modifier};
use crate::semantic::{StyleNames, DEFAULT_STYLE_PRIORITY};

pub const DEFAULT_STYLE_NAME: &str = "-pale";

pub fn style(chart: &mut Chart, style_name: &str) -> StyleNames {
    chart
        .style_mut(style_name)
        .set_priority(DEFAULT_STYLE_PRIORITY)
        .add_modifier(Modifier::new().outline(":pale").fill(":pale"));
    StyleNames::from([style_name.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_chart::sample;

    #[test]
    fn test_pale_style() {
        let mut chart = sample();
        let names = style(&mut chart, DEFAULT_STYLE_NAME);
        assert!(names.contains("-pale"));
        assert_eq!(chart.styles()["-pale"].modifiers[0].outline.as_deref(), Some(":pale"));
    }
}
