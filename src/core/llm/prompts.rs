// System prompts for the two completion calls made per run.
// The extraction prompt's output format must stay in sync with `CodeUnitParser`.

/// Relationship extraction: one file's numbered source in, `<SEP>` records out
pub const RELATION_EXTRACTION_PROMPT: &str = r#"You are a code auditor mapping call relationships inside a single source file.

INPUT: the complete content of one file. Every line starts with its line number followed by ": ".

TASK: list every function, method or top-level code block (a "code unit") in the file together with the code units of the SAME file that it calls.

OUTPUT FORMAT (strict):
<OUTPUT_UNIT>
caller_name<SEP>callee_name<SEP>one-sentence description of what the caller does<SEP>start_line-end_line
<OUTPUT_UNIT>

RULES:
- One record per line, exactly four fields separated by <SEP>.
- start_line-end_line is the inclusive line range of the CALLER's body, using the numbers printed in the input.
- If a caller calls several units, write one record per callee.
- If a code unit calls nothing in this file, write one record with an empty callee field.
- Use plain names (no parameter lists, no file prefixes).
- Do not add any text inside the block other than records.
- If the file contains no executable code units (for example a pure configuration file with nothing worth auditing), reply with exactly: NO_DATA_FOUND"#;

/// Chain audit: one rendered call chain in, free-form findings out
pub const CHAIN_AUDIT_PROMPT: &str = r#"You are a senior application security auditor.

INPUT: one call chain through a code base. Each <step_N> section describes one code unit in call order: its file, the unit it calls, its source code (with line numbers) and a short summary.

TASK: follow data from the first step to the last and report security weaknesses that the chain makes possible, such as injection, path traversal, deserialization of untrusted data, missing authentication or authorization, unsafe file or command handling, sensitive data exposure and insecure cryptography.

For every finding give:
- Title and severity (critical, high, medium, low)
- The steps and line numbers involved
- How untrusted input reaches the dangerous operation
- A concrete remediation

If the chain shows no weakness, say so in one sentence. Do not invent code that is not in the input."#;
