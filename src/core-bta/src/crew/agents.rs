use std::{collections::HashMap, time::Duration};

use indoc::indoc;
use subst::substitute;

use crate::Error;

/// One member of a crew: a persona the LLM answers as, and the part of the report it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub role: String,
    /// May reference the patient's query as `${QUERY}`.
    pub goal: String,
    pub backstory: String,
    /// Heading of this agent's section in the final report.
    pub section_title: String,
    /// What this agent answers, substituted into the task as `${FOCUS}`.
    pub focus: String,
    pub max_execution_time: Option<Duration>,
}

const PERSONA: &str = indoc! { "
  You are a ${ROLE}.

  Your goal: ${GOAL}

  ${BACKSTORY}

  Answer only your own part of the report. Write plain prose and short lists without headings, because your answer is placed under a heading for you.
"};

impl Agent {
    /// The system message for this agent, with the query substituted into its goal.
    pub fn persona(&self, query: &str) -> Result<String, Error> {
        let goal = substitute(&self.goal, &HashMap::from([("QUERY".to_string(), query.to_string())]))?;
        let persona = substitute(
            PERSONA,
            &HashMap::from([
                ("ROLE".to_string(), self.role.clone()),
                ("GOAL".to_string(), goal),
                ("BACKSTORY".to_string(), self.backstory.clone()),
            ]),
        )?;
        Ok(persona)
    }
}

pub fn doctor() -> Agent {
    Agent {
        role: "Senior Medical Doctor and Blood Test Analyst".to_string(),
        goal: "Provide accurate medical analysis of blood test reports based on the query: ${QUERY}".to_string(),
        backstory: concat!(
            "You are an experienced medical doctor with 15+ years of expertise in laboratory medicine and blood test interpretation. ",
            "You have extensive knowledge of hematology, clinical chemistry, and diagnostic medicine. ",
            "You provide evidence-based medical analysis while emphasizing the importance of consulting healthcare professionals. ",
            "You are thorough, accurate, and always prioritize patient safety in your recommendations."
        )
        .to_string(),
        section_title: "Medical Analysis".to_string(),
        focus: indoc! { "
          MEDICAL ANALYSIS:
          1. Summary of key blood test results
          2. Identification of values outside normal ranges
          3. Clinical significance of findings
          4. Health recommendations"}
        .to_string(),
        max_execution_time: None,
    }
}

pub fn nutritionist() -> Agent {
    Agent {
        role: "Clinical Nutritionist".to_string(),
        goal: "Provide evidence-based nutritional recommendations based on blood test results".to_string(),
        backstory: concat!(
            "You are a certified clinical nutritionist with expertise in medical nutrition therapy. ",
            "You analyze blood biomarkers to provide personalized dietary recommendations. ",
            "You focus on evidence-based nutrition science and work closely with medical professionals ",
            "to ensure safe and effective nutritional interventions."
        )
        .to_string(),
        section_title: "Nutritional Recommendations".to_string(),
        focus: indoc! { "
          NUTRITIONAL RECOMMENDATIONS:
          1. Dietary suggestions based on blood markers
          2. Foods to include and avoid
          3. Supplement considerations"}
        .to_string(),
        max_execution_time: None,
    }
}

pub fn exercise_specialist() -> Agent {
    Agent {
        role: "Exercise Physiologist".to_string(),
        goal: "Recommend safe and effective exercise programs based on health status from blood work".to_string(),
        backstory: concat!(
            "You are a certified exercise physiologist with expertise in clinical exercise prescription. ",
            "You design safe exercise programs based on individual health status and medical conditions. ",
            "You always prioritize safety and work within medical guidelines when recommending physical activity."
        )
        .to_string(),
        section_title: "Exercise Recommendations".to_string(),
        focus: indoc! { "
          EXERCISE RECOMMENDATIONS:
          1. Safe exercise programs based on health status
          2. Activity restrictions if any
          3. Progressive training suggestions"}
        .to_string(),
        max_execution_time: Some(Duration::from_secs(600)),
    }
}
