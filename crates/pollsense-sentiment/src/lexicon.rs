//! AFINN-style word weights for free-text survey answers.
//!
//! Integer weights in `[-5, 5]`. Keys are lowercase single tokens.

pub(crate) const AFINN: &[(&str, i8)] = &[
    // Positive
    ("accept", 1),
    ("accepted", 1),
    ("accomplished", 2),
    ("admire", 3),
    ("adore", 3),
    ("advantage", 2),
    ("agree", 1),
    ("agreed", 1),
    ("amazing", 4),
    ("appreciate", 2),
    ("appreciated", 2),
    ("approve", 2),
    ("awesome", 4),
    ("beautiful", 3),
    ("benefit", 2),
    ("benefits", 2),
    ("best", 3),
    ("better", 2),
    ("breathtaking", 5),
    ("brilliant", 4),
    ("calm", 2),
    ("care", 2),
    ("clean", 2),
    ("clear", 1),
    ("comfortable", 2),
    ("confident", 2),
    ("cool", 1),
    ("cute", 2),
    ("delight", 3),
    ("delighted", 3),
    ("easy", 1),
    ("effective", 2),
    ("efficient", 2),
    ("encourage", 2),
    ("engaging", 1),
    ("enjoy", 2),
    ("enjoyed", 2),
    ("enthusiastic", 3),
    ("excellent", 3),
    ("excited", 3),
    ("exciting", 3),
    ("fair", 2),
    ("fantastic", 4),
    ("favorite", 2),
    ("fine", 2),
    ("friendly", 2),
    ("fun", 4),
    ("funny", 4),
    ("glad", 3),
    ("good", 3),
    ("great", 3),
    ("happy", 3),
    ("helpful", 2),
    ("hope", 2),
    ("impressed", 3),
    ("impressive", 3),
    ("improve", 2),
    ("improved", 2),
    ("inspired", 2),
    ("interesting", 2),
    ("insightful", 2),
    ("like", 2),
    ("liked", 2),
    ("love", 3),
    ("loved", 3),
    ("lovely", 3),
    ("nice", 3),
    ("ok", 2),
    ("okay", 2),
    ("outstanding", 5),
    ("perfect", 3),
    ("pleasant", 3),
    ("pleased", 3),
    ("positive", 2),
    ("recommend", 2),
    ("recommended", 2),
    ("relaxed", 2),
    ("satisfied", 2),
    ("smart", 1),
    ("strong", 2),
    ("success", 2),
    ("successful", 3),
    ("super", 3),
    ("superb", 5),
    ("support", 2),
    ("supportive", 2),
    ("thank", 2),
    ("thanks", 2),
    ("thrilled", 5),
    ("useful", 2),
    ("valuable", 2),
    ("welcome", 2),
    ("win", 4),
    ("wonderful", 4),
    ("wow", 4),
    // Negative
    ("abandon", -2),
    ("abandoned", -2),
    ("abuse", -3),
    ("afraid", -2),
    ("aggressive", -2),
    ("angry", -3),
    ("annoy", -2),
    ("annoyed", -2),
    ("annoying", -2),
    ("anxious", -2),
    ("awful", -3),
    ("bad", -3),
    ("bored", -2),
    ("boring", -3),
    ("broken", -1),
    ("catastrophic", -4),
    ("chaos", -2),
    ("complain", -2),
    ("complaint", -2),
    ("confused", -2),
    ("confusing", -2),
    ("crap", -3),
    ("crash", -2),
    ("crisis", -3),
    ("cry", -1),
    ("damage", -3),
    ("danger", -2),
    ("delay", -1),
    ("delayed", -1),
    ("disappoint", -2),
    ("disappointed", -2),
    ("disappointing", -2),
    ("disaster", -2),
    ("dislike", -2),
    ("dissatisfied", -2),
    ("fail", -2),
    ("failed", -2),
    ("failure", -2),
    ("fault", -2),
    ("fear", -2),
    ("fraud", -4),
    ("frustrated", -2),
    ("frustrating", -2),
    ("hate", -3),
    ("hated", -3),
    ("horrible", -3),
    ("hurt", -2),
    ("ignored", -2),
    ("lack", -2),
    ("lame", -2),
    ("mess", -2),
    ("miss", -2),
    ("no", -1),
    ("pain", -2),
    ("poor", -2),
    ("problem", -2),
    ("problems", -2),
    ("regret", -2),
    ("rude", -2),
    ("sad", -2),
    ("scared", -2),
    ("sorry", -1),
    ("stress", -1),
    ("stressed", -2),
    ("stupid", -2),
    ("terrible", -3),
    ("tired", -2),
    ("torture", -4),
    ("trouble", -2),
    ("ugly", -3),
    ("unfair", -2),
    ("unhappy", -2),
    ("useless", -2),
    ("waste", -1),
    ("weak", -2),
    ("worried", -3),
    ("worse", -3),
    ("worst", -3),
    ("wrong", -2),
];

/// Tokens that flip the weight of the word immediately after them.
pub(crate) const NEGATORS: &[&str] = &[
    "not", "no", "never", "cannot", "can't", "cant", "don't", "dont", "doesn't", "doesnt",
    "didn't", "didnt", "isn't", "isnt", "wasn't", "wasnt", "aren't", "arent", "won't", "wont",
    "wouldn't", "shouldn't", "couldn't", "hardly", "without",
];
