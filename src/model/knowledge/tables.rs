//! Kala Pola reference tables
//!
//! Both tables are indexed `[likelihood][impact]` in the order Low, Medium, High.

pub(super) struct GuidelineText {
    pub objective: &'static str,
    pub on_ground: &'static str,
    pub digital: &'static str,
    pub authority: &'static str,
}

/// Table 1: example scenarios per severity cell
pub(super) const SCENARIOS: [[&[&str]; 3]; 3] = [
    // Likelihood: Low
    [
        &[
            "Artist complains about low sales",
            "Minor signage placement disputes",
            "Single visitor complaint about crowding",
            "Delayed setup affecting one stall only",
        ],
        &[
            "Artist disputes curatorial guidelines publicly",
            "Influencer records mild criticism",
            "Accessibility complaint raised publicly",
            "Visitor posts negative experience online",
        ],
        &[
            "Physical altercation between artists",
            "Threats of vandalism",
            "Safety incident requiring emergency response",
            "Media framing incident as systemic failure",
        ],
    ],
    // Likelihood: Medium
    [
        &[
            "Artist disputes stall allocation",
            "Power outage at individual stalls",
            "Lighting or space related complaints",
            "Artist disputes confirmation timelines",
        ],
        &[
            "Raised voices between artist and volunteer",
            "Artist refuses to comply with stall rules",
            "Multiple artists raising similar complaints",
            "Crowd begins to gather around dispute",
        ],
        &[
            "Artist goes live on social media during dispute",
            "Grouped artist protest",
            "Media interviews artist mid incident",
            "Sponsor named in negative commentary",
        ],
    ],
    // Likelihood: High
    [
        &[
            "Artists expressing frustration verbally",
            "Repeat questions about logistics",
            "Emotional but non-aggressive reactions",
        ],
        &[
            "Misinformation shared in small online circles",
            "Escalated verbal abuse",
            "Recording with intent to post",
            "Multiple negative social media posts",
            "Public questioning of fairness or transparency",
        ],
        &[
            "Repeat offender artist raising multiple issues",
            "Coordinated complaints across volunteers",
            "Escalated verbal abuse",
            "Recording with intent to post",
            "Multiple negative social media posts",
            "Public questioning of fairness or transparency",
        ],
    ],
];

/// Table 2: response guidelines per severity cell
pub(super) const GUIDELINES: [[GuidelineText; 3]; 3] = [
    // Likelihood: Low
    [
        GuidelineText {
            objective: "Keep the incident small and prevent it from disrupting the event flow.",
            on_ground: "Volunteer acknowledges the issue once, then politely moves away. Only escalate if the same issue is raised again.",
            digital: "Do not respond publicly. Monitor quietly to see if it becomes a bigger issue.",
            authority: "Volunteer handles it. Supervisor is only informed if a pattern develops.",
        },
        GuidelineText {
            objective: "Keep the incident contained and stop it from drawing a crowd or going viral online.",
            on_ground: "Supervisor takes over. Provide brief factual information if needed, then disengage.",
            digital: "Monitor social media passively. Do not respond unless a negative narrative starts forming.",
            authority: "Supervisor handles it. Foundation teams are notified for awareness.",
        },
        GuidelineText {
            objective: "Eliminate immediate safety risks and protect the event's reputation.",
            on_ground: "Senior authority and Supervisor step in immediately. Contact security if there's a safety concern.",
            digital: "Prepare a statement but do not post it unless the content starts spreading widely.",
            authority: "Senior event leadership handles it. Keells and Keyt Foundations are fully informed.",
        },
    ],
    // Likelihood: Medium
    [
        GuidelineText {
            objective: "Keep the event running smoothly and ensure artists can continue without friction.",
            on_ground: "Volunteer acknowledges the concern. Supervisor provides a solution only if necessary.",
            digital: "Do not respond. Just listen passively.",
            authority: "Volunteers and Supervisors handle it.",
        },
        GuidelineText {
            objective: "Reduce tension and prevent crowds from gathering or people from recording the incident.",
            on_ground: "Supervisor takes full control. Volunteer must step back and document the incident.",
            digital: "Actively monitor social media. Prepare internal notes for potential response.",
            authority: "Supervisors handle it. Foundation communication teams are informed.",
        },
        GuidelineText {
            objective: "Protect the reputation and credibility of the partner organizations.",
            on_ground: "Senior authority is present on-site. Security is engaged. Clear chain of command is enforced.",
            digital: "Coordinate response across teams. Have an approved statement ready to use if needed.",
            authority: "Kala Pola leadership and Foundation communications handle it.",
        },
    ],
    // Likelihood: High
    [
        GuidelineText {
            objective: "Maintain the organization's reputation while ignoring minor noise.",
            on_ground: "Volunteers handle it routinely. Only escalate if the tone becomes aggressive.",
            digital: "Do not respond. Ignore isolated negative comments.",
            authority: "Volunteers handle it.",
        },
        GuidelineText {
            objective: "Stop repeat behaviors and prevent patterns from forming among troublemakers.",
            on_ground: "Supervisor intervention is required. Flag repeat offenders for possible removal or disengagement.",
            digital: "Actively monitor social media. Ensure all teams are aligned on messaging.",
            authority: "Supervisors handle it. Foundation representatives are briefed.",
        },
        GuidelineText {
            objective: "Stop systematic disruption and prevent repeat offenders from causing more problems.",
            on_ground: "Immediate Supervisor intervention required. Track the incident as high-risk behavior.",
            digital: "Actively monitor. Ensure internal teams agree on a single consistent message.",
            authority: "Supervisors and Foundation representatives handle it.",
        },
    ],
];
