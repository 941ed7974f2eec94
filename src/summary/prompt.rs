use crate::csv_processor::preview_text;

pub fn build_summary_prompt(header: &[String], sample_rows: &[Vec<String>]) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a data analyst. I have a CSV file.\n");
    prompt.push_str(&format!(
        "Here are the headers and the first {} rows of data:\n\n",
        sample_rows.len()
    ));

    prompt.push_str("```csv\n");
    prompt.push_str(&preview_text(header, sample_rows));
    prompt.push_str("\n```\n\n");

    prompt.push_str(
        "Please provide a concise summary (max 3 sentences) describing what this dataset likely represents.\n",
    );
    prompt.push_str(
        "Then, verify if the data looks consistent or if there are any obvious anomalies in this small sample.\n",
    );
    prompt.push_str("Keep it professional and helpful.\n");

    prompt
}
