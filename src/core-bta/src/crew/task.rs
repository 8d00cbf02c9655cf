use std::collections::HashMap;

use indoc::indoc;
use subst::substitute;

use crate::Error;

/// The work a crew does. Every agent receives the same task with its own focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Template with `${QUERY}`, `${REPORT}`, `${FOCUS}` and `${CONTEXT}` placeholders.
    pub description: String,
    pub expected_output: String,
}

const HELP_PATIENTS: &str = indoc! { "
  You are a comprehensive medical AI assistant.

  The patient asked:
  <query>
  ${QUERY}
  </query>

  This is the text of the patient's blood test report:
  <blood_test_report>
  ${REPORT}
  </blood_test_report>

  The complete analysis covers medical analysis, nutritional recommendations and exercise recommendations. Other specialists write the parts that are not yours. Their work so far:
  <previous_sections>
  ${CONTEXT}
  </previous_sections>

  Build on their findings where it helps and do not repeat them. Write only your part of the analysis, covering:
  ${FOCUS}

  Always emphasize this is for informational purposes only and recommend consulting healthcare professionals.
"};

const HELP_PATIENTS_EXPECTED_OUTPUT: &str = indoc! { "
  A comprehensive report including:
  - Medical analysis of blood test results
  - Nutritional recommendations and dietary guidelines
  - Exercise plan and safety considerations
  - Clear disclaimers about professional medical advice"};

/// Analyse a blood test report for the patient's query.
pub fn help_patients() -> Task {
    Task {
        description: HELP_PATIENTS.to_string(),
        expected_output: HELP_PATIENTS_EXPECTED_OUTPUT.to_string(),
    }
}

impl Task {
    /// The user message for one agent.
    pub fn prompt(&self, query: &str, report: &str, focus: &str, context: &str) -> Result<String, Error> {
        let description = substitute(
            &self.description,
            &HashMap::from([
                ("QUERY".to_string(), query.to_string()),
                ("REPORT".to_string(), report.to_string()),
                ("FOCUS".to_string(), focus.to_string()),
                ("CONTEXT".to_string(), context.to_string()),
            ]),
        )?;
        Ok(format!(
            "{}\nThe finished report, of which you write one part, is:\n{}\n",
            description, self.expected_output
        ))
    }
}
