//! Prompt templates for grounded extraction.

/// Instruction sent with every uploaded document.
///
/// The response must be a JSON array whose objects carry exactly the keys
/// `instruction`, `input`, `output`, `page_number`, `source_quote` and `section`.
pub const EXTRACTION_PROMPT: &str = r#"You are an expert technical documentation analyst specializing in L&W casino systems.

CRITICAL INSTRUCTIONS FOR GROUNDED EXTRACTION:
- You MUST extract information ONLY from what is explicitly written in the PDF
- NEVER infer, assume, or make up information not present in the document
- For EVERY piece of extracted information, you MUST cite the exact page number
- Include direct quotes from the PDF as evidence

Your task is to extract technical Q&A pairs following these dimensions:
1. Operational Logic: How to configure features (Offers, Blackouts, mappings, etc.)
2. Troubleshooting: Error messages, failure scenarios, and resolution steps
3. UI Navigation: Menu paths, button locations, screen transitions
4. Business Rules: Specific values, limits, calculations, currency rules

REQUIRED OUTPUT FORMAT (JSON List):
[
  {
    "instruction": "Clear technical question based on the document content",
    "input": "Context (system version, screen location, user scenario)",
    "output": "Step-by-step solution or explanation",
    "page_number": <integer>,
    "source_quote": "Exact text snippet from the PDF that backs up this Q&A pair",
    "section": "Section title or heading from the document"
  }
]

VALIDATION RULES:
- page_number: Must be a valid page number from the PDF
- source_quote: Must be a verbatim quote of at least 10 words from the PDF
- section: The heading/title of the section where this information was found
- If you cannot find explicit information for a Q&A pair, DO NOT include it
- Prioritize accuracy over quantity

Extract as many high-quality, grounded Q&A pairs as possible from this document."#;
