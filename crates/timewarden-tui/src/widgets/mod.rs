pub mod usage_chart;
