pub mod learning_agent;
pub mod policy;
pub mod q_table;
pub mod reward;
