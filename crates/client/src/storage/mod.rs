// Workers KV: namespaces and their keys/values

mod kv;
mod namespaces;
