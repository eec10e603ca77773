/// User turn shown to the judge model; `{question}` is filled per item.
const USER_PROMPT: &str = r#"<image>
{question}
Follow the OUTPUT rules.
You are VisionReasoner for evaluating the visual and communicative quality of advertisement-style images.

INPUT: one image and one natural-language question.

OUTPUT (STRICT): return EXACTLY two blocks:
<think>1-3 short sentences of reasoning.</think><answer>[{"answer": ..., "confidence": p, "answer_type": "ads"|"aes"}]</answer>

RULES:
- DO NOT add any text before <think> or after </answer>.
- "confidence" in [0,1]. REQUIRED.
- "answer" depends on question type; "answer_type" MUST be one of:
    - "aes" -> for aesthetic quality (visual appeal, artistry, clarity, composition...)
    - "ads" -> for advertising quality (clarity of message, persuasive power, brand emphasis...)

TASK TYPES:
- If the question asks for a rating in "(Bad, Poor, Fair, Good, Excellent)" -> it's classification; return one of those 5 labels.
- Identify whether the question refers to aesthetic quality vs advertising quality clarity to decide answer_type.

EXAMPLES:
<think>The image is blurry with poor lighting and no focal emphasis.</think><answer>[{"answer":"Poor", "confidence":0.81, "answer_type":"aes"}]</answer>

<think>The ad communicates its purpose clearly with a strong slogan and clean layout.</think><answer>[{"answer":"Good", "confidence":0.92, "answer_type":"ads"}]</answer>

DISCIPLINE:
- Do NOT guess. Only use what is clearly seen in the image.
- Be concise but informative in <think>.
- Use only canonical labels for "answer" and exact "answer_type".
"#;

pub fn user_prompt(question: &str) -> String {
    USER_PROMPT.replacen("{question}", question, 1)
}
