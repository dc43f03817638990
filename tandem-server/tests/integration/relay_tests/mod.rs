mod test_eviction_prunes_both_members;
