use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::reading::Anomaly;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
}

impl AnomalyReport {
    pub fn new(anomalies: Vec<Anomaly>) -> Self {
        Self { anomalies }
    }

    pub fn write_pretty(&self, mut writer: impl Write) -> anyhow::Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut ser)?;
        writeln!(writer)?;
        Ok(())
    }

    pub fn to_pretty_string(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.write_pretty(&mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let report = AnomalyReport::new(vec![
            Anomaly::new(6.5, "A".to_owned(), "2024-05-04T11:50:00Z".to_owned()),
        ]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, serde_json::json!({
            "anomalies": [
                {"magnetic_field": 6.5, "sensor_id": "A", "sent_time": "2024-05-04T11:50:00Z"}
            ]
        }));
    }

    #[test]
    fn test_pretty_layout() {
        let report = AnomalyReport::new(vec![
            Anomaly::new(6.5, "A".to_owned(), "2024-05-04T11:50:00Z".to_owned()),
        ]);
        let expected = "\
{
    \"anomalies\": [
        {
            \"magnetic_field\": 6.5,
            \"sensor_id\": \"A\",
            \"sent_time\": \"2024-05-04T11:50:00Z\"
        }
    ]
}
";
        assert_eq!(report.to_pretty_string().unwrap(), expected);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(AnomalyReport::default().to_pretty_string().unwrap(), "{\n    \"anomalies\": []\n}\n");
    }
}
